pub mod balance;
pub mod health;
pub mod summoner;
