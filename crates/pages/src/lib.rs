//! Page objects for the CRM under test. Each page wraps the shared browser
//! session and exposes the flows the scenarios drive.

pub mod dashboard;
pub mod data;
pub mod forgot_password;
pub mod locators;
pub mod login;
pub mod register;
pub mod register_company;
pub mod reset_password;
pub mod subscription;

pub use dashboard::DashboardPage;
pub use data::{CompanyData, UserData};
pub use forgot_password::ForgotPasswordPage;
pub use login::LoginPage;
pub use register::RegisterPage;
pub use register_company::RegisterCompanyPage;
pub use reset_password::ResetPasswordPage;
pub use subscription::SubscriptionPage;
