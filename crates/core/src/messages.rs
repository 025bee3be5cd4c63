//! Validation strings the CRM renders, one table per page. Each table maps
//! both ways: label -> text for assertions, text -> label so a mismatched
//! message can be named in a diagnostic.

pub const UNKNOWN_USE_CASE: &str = "UNKNOWN USE CASE";

/// Explicit bidirectional label<->text table.
#[derive(Debug)]
pub struct MessageTable {
    entries: &'static [(&'static str, &'static str)],
}

impl MessageTable {
    pub const fn new(entries: &'static [(&'static str, &'static str)]) -> Self {
        Self { entries }
    }

    pub fn text_of(&self, label: &str) -> Option<&'static str> {
        self.entries
            .iter()
            .find(|(l, _)| *l == label)
            .map(|(_, text)| *text)
    }

    /// Which use case a displayed message normally belongs to.
    pub fn label_of(&self, text: &str) -> &'static str {
        self.entries
            .iter()
            .find(|(_, t)| *t == text)
            .map_or(UNKNOWN_USE_CASE, |(label, _)| *label)
    }
}

pub mod login {
    use super::MessageTable;

    pub const INVALID_EMAIL: &str = "Le champ E-mail doit contenir une adresse e-mail valide.";
    pub const EMPTY_EMAIL: &str = "Le champ E-mail est obligatoire.";
    pub const EMPTY_PASSWORD: &str = "Le champ Mot de passe est obligatoire.";
    pub const WRONG_CREDENTIALS: &str =
        "Votre compte n'a pas été trouvé. Veuillez réessayer svp";
    pub const RESET_PASSWORD_SUCCESS: &str = "Votre mot de passe a été modifié !";

    pub const TABLE: MessageTable = MessageTable::new(&[
        ("INVALID_EMAIL", INVALID_EMAIL),
        ("EMPTY_EMAIL", EMPTY_EMAIL),
        ("EMPTY_PASSWORD", EMPTY_PASSWORD),
        ("WRONG_CREDENTIALS", WRONG_CREDENTIALS),
        ("RESET_PASSWORD_SUCCESS", RESET_PASSWORD_SUCCESS),
    ]);
}

pub mod register {
    use super::MessageTable;

    pub const INVALID_EMAIL: &str = "Le champ E-mail doit contenir une adresse e-mail valide.";
    pub const INVALID_PASSWORD: &str =
        "Le mot de passe doit contenir au moins 8 caractères.";
    pub const INVALID_PASSWORD_CONFIRMATION: &str =
        "Le champ Confirmation du mot de passe ne correspond pas.";
    pub const EMPTY_LASTNAME: &str = "Le champ Nom est obligatoire.";
    pub const EMPTY_FIRSTNAME: &str = "Le champ Prénom est obligatoire.";
    pub const EMPTY_EMAIL: &str = "Le champ E-mail est obligatoire.";
    pub const EMPTY_PASSWORD: &str = "Le champ Mot de passe est obligatoire.";
    pub const ALREADY_REGISTERED: &str = "L'adresse e-mail est déjà utilisée.";

    pub const TABLE: MessageTable = MessageTable::new(&[
        ("INVALID_EMAIL", INVALID_EMAIL),
        ("INVALID_PASSWORD", INVALID_PASSWORD),
        ("INVALID_PASSWORD_CONFIRMATION", INVALID_PASSWORD_CONFIRMATION),
        ("EMPTY_LASTNAME", EMPTY_LASTNAME),
        ("EMPTY_FIRSTNAME", EMPTY_FIRSTNAME),
        ("EMPTY_EMAIL", EMPTY_EMAIL),
        ("EMPTY_PASSWORD", EMPTY_PASSWORD),
        ("ALREADY_REGISTERED", ALREADY_REGISTERED),
    ]);
}

pub mod register_company {
    use super::MessageTable;

    pub const INVALID_EMAIL: &str = "Le champ E-mail doit être une adresse email valide.";
    pub const EMPTY_NAME: &str = "Le champ nom est obligatoire.";
    pub const EMPTY_SIRET: &str = "Le champ siret est obligatoire.";
    pub const EMPTY_EMAIL: &str = "Le champ E-mail est obligatoire.";
    pub const ALREADY_REGISTERED: &str = "La valeur du champ E-mail est déjà utilisée.";

    pub const TABLE: MessageTable = MessageTable::new(&[
        ("INVALID_EMAIL", INVALID_EMAIL),
        ("EMPTY_NAME", EMPTY_NAME),
        ("EMPTY_SIRET", EMPTY_SIRET),
        ("EMPTY_EMAIL", EMPTY_EMAIL),
        ("ALREADY_REGISTERED", ALREADY_REGISTERED),
    ]);
}

pub mod forgot_password {
    use super::MessageTable;

    pub const EMPTY_EMAIL: &str = "Le champ E-mail est obligatoire.";
    pub const INVALID_EMAIL: &str = "Le champ E-mail doit contenir une adresse e-mail valide.";
    pub const UNREGISTERED_EMAIL: &str = "Le champ E-mail sélectionné est invalide.";
    pub const SUCCESS_MESSAGE: &str =
        "Nous avons envoyé par e-mail le lien de réinitialisation de votre mot de passe!";

    pub const TABLE: MessageTable = MessageTable::new(&[
        ("EMPTY_EMAIL", EMPTY_EMAIL),
        ("INVALID_EMAIL", INVALID_EMAIL),
        ("UNREGISTERED_EMAIL", UNREGISTERED_EMAIL),
        ("SUCCESS_MESSAGE", SUCCESS_MESSAGE),
    ]);
}

pub mod reset_password {
    use super::MessageTable;

    pub const EMPTY_PASSWORD: &str = "Le champ Mot de passe est obligatoire.";
    pub const EMPTY_PASSWORD_CONFIRMATION: &str =
        "Le champ Confirmation du mot de passe est obligatoire.";
    pub const INVALID_PASSWORD: &str =
        "Le mot de passe doit contenir au moins 8 caractères.";
    pub const INVALID_PASSWORD_CONFIRMATION: &str =
        "Le champ Confirmation du mot de passe ne correspond pas.";

    pub const TABLE: MessageTable = MessageTable::new(&[
        ("EMPTY_PASSWORD", EMPTY_PASSWORD),
        ("EMPTY_PASSWORD_CONFIRMATION", EMPTY_PASSWORD_CONFIRMATION),
        ("INVALID_PASSWORD", INVALID_PASSWORD),
        ("INVALID_PASSWORD_CONFIRMATION", INVALID_PASSWORD_CONFIRMATION),
    ]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_round_trips_both_directions() {
        assert_eq!(
            login::TABLE.text_of("WRONG_CREDENTIALS"),
            Some(login::WRONG_CREDENTIALS)
        );
        assert_eq!(
            login::TABLE.label_of(login::WRONG_CREDENTIALS),
            "WRONG_CREDENTIALS"
        );
        assert_eq!(
            forgot_password::TABLE.label_of(forgot_password::SUCCESS_MESSAGE),
            "SUCCESS_MESSAGE"
        );
    }

    #[test]
    fn unknown_text_falls_back() {
        assert_eq!(login::TABLE.label_of("Une erreur inconnue"), UNKNOWN_USE_CASE);
        assert_eq!(register::TABLE.text_of("NOT_A_LABEL"), None);
    }
}
