//! Host-side control of wavelength-selective switch (WSS) modules.
//!
//! # Crate Structure
//!
//! - [`transport`]: Serial link abstraction and the UART adapter
//! - [`frame`]: Marker-delimited, XOR-checksummed frame codec
//! - [`driver`]: Transaction engine, register catalog and typed accessors

/// Re-export transport types.
pub mod transport {
    pub use wss_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use wss_frame::*;
}

/// Re-export driver types.
pub mod driver {
    pub use wss_driver::*;
}
