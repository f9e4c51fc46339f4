pub mod account;
pub mod admin;
pub mod auth;
pub mod calendar;
pub mod campus;
pub mod checkout;
pub mod cron;
pub mod leads;
pub mod packages;
