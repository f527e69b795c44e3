pub mod catalog;
pub mod error;
pub mod link;
pub mod session;
pub mod settings;
pub mod sim;
pub mod transcript;

#[cfg(test)]
mod test;
