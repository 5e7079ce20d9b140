pub mod catalog;
pub mod composer;
pub mod db;
pub mod goals;
pub mod history;
pub mod ledger;
pub mod models;
pub mod openfoodfacts;
pub mod scaling;
pub mod service;
pub mod store;
