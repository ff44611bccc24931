pub mod date;
pub mod logging;
pub mod sqlite;
pub mod validator;

#[cfg(test)]
pub(crate) mod testing;
