pub(crate) mod health;
pub(crate) mod layout;
pub(crate) mod market;
pub(crate) mod news;
pub(crate) mod stocks;
