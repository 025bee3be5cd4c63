/// Endpoint map of the CRM under test, derived from one base URL.
#[derive(Debug, Clone)]
pub struct Urls {
    pub base: String,
    pub login: String,
    pub logout: String,
    pub dashboard: String,
    pub register: String,
    pub register_company: String,
    pub forgot_password: String,
    /// Reset links carry a token after this prefix.
    pub reset_password_prefix: String,
    pub subscription: String,
    pub company_history: String,
    pub profile: String,
}

impl Urls {
    pub fn new(base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/').to_string();
        Self {
            login: format!("{base}/login"),
            logout: format!("{base}/logout"),
            dashboard: format!("{base}/dashboard"),
            register: format!("{base}/register"),
            register_company: format!("{base}/register/company"),
            forgot_password: format!("{base}/forgot-password"),
            reset_password_prefix: format!("{base}/reset-password/"),
            subscription: format!("{base}/change-forfait"),
            company_history: format!("{base}/historiques"),
            profile: format!("{base}/profil"),
            base,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_from_base() {
        let urls = Urls::new("https://crm.rapidosoftware.com/");
        assert_eq!(urls.base, "https://crm.rapidosoftware.com");
        assert_eq!(urls.login, "https://crm.rapidosoftware.com/login");
        assert_eq!(
            urls.register_company,
            "https://crm.rapidosoftware.com/register/company"
        );
        assert_eq!(
            urls.reset_password_prefix,
            "https://crm.rapidosoftware.com/reset-password/"
        );
        assert_eq!(
            urls.subscription,
            "https://crm.rapidosoftware.com/change-forfait"
        );
    }
}
