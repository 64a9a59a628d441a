pub mod mysql_adapter;
pub mod port;

pub use mysql_adapter::MySqlDb;
pub use port::{Db, Param, Row, Statement, Value};
