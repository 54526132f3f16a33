//! Host-side driver for WSS modules.
//!
//! This is the layer callers use. Every operation is one blocking
//! request/response exchange on a [`Port`]: the request is built from the
//! [`catalog`] entry of the register involved, the reply is checked for
//! message-id echo and result code, and its payload is interpreted per the
//! register's [`ResponseSpec`].

mod accessors;
pub mod catalog;
pub mod error;
pub mod port;
pub mod scale;
pub mod shape;
pub mod transaction;
pub mod types;

pub use catalog::{Access, Instance, Register};
pub use error::{Result, TransactionError};
pub use port::{Port, PortConfig};
pub use scale::{ghz_to_grid, grid_to_ghz, ScaleError, GRID_GHZ};
pub use shape::{interpret, ByteCombine, NamedValue, ResponseSpec, Shape, Value};
pub use transaction::{execute, execute_exchange, Exchange};
pub use types::{
    AlarmFlags, BootMode, ChannelRoute, FirmwareAction, ModuleInfo, PostFlags, Waveplan,
    WaveplanChannel,
};
