pub mod check_mail;
pub mod list;
pub mod run;
