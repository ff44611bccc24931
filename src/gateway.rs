pub mod events;
pub mod factory;
pub mod logs;
pub mod sqlite;

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum GatewayPublisherVia {
    Sqlite,
    Logs,
}
