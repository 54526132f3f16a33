//! One physical connection to a module.
//!
//! The line is half-duplex, so a [`Port`] serializes exchanges: its lock is
//! held from the first request byte until the reply is validated. Separate
//! ports are independent and can be driven from separate threads.

use std::sync::Mutex;
use std::time::Duration;

use bytes::Bytes;
use tracing::debug;
use wss_frame::{CommandCode, Field, FrameConfig};
use wss_transport::Transport;

use crate::catalog::Register;
use crate::error::{Result, TransactionError};
use crate::shape::{ResponseSpec, Value};
use crate::transaction::{execute_exchange, Exchange};

/// Port configuration.
#[derive(Debug, Clone)]
pub struct PortConfig {
    /// Timeout applied to each blocking read on the transport.
    pub read_timeout: Option<Duration>,
    pub frame: FrameConfig,
}

impl Default for PortConfig {
    fn default() -> Self {
        Self {
            read_timeout: Some(Duration::from_secs(1)),
            frame: FrameConfig::default(),
        }
    }
}

struct Link<T> {
    transport: T,
    next_id: u8,
    needs_resync: bool,
}

impl<T> Link<T> {
    /// Message ids run 1..=255; 0 is never used.
    fn allocate_id(&mut self) -> u8 {
        let id = self.next_id;
        self.next_id = id.checked_add(1).unwrap_or(1);
        id
    }
}

/// A transport plus the per-connection state exchanges need.
pub struct Port<T> {
    link: Mutex<Link<T>>,
    config: PortConfig,
}

impl<T: Transport> Port<T> {
    /// Open a port with default configuration.
    pub fn new(transport: T) -> Result<Self> {
        Self::with_config(transport, PortConfig::default())
    }

    /// Open a port and apply `config.read_timeout` to the transport.
    pub fn with_config(mut transport: T, config: PortConfig) -> Result<Self> {
        transport.set_read_timeout(config.read_timeout)?;
        Ok(Self {
            link: Mutex::new(Link {
                transport,
                next_id: 1,
                needs_resync: false,
            }),
            config,
        })
    }

    /// Run one exchange and return everything it produced.
    ///
    /// After a timeout, a malformed reply or a stale message id the line
    /// state is unknown; the next exchange first discards pending input.
    pub fn exchange(
        &self,
        command: CommandCode,
        fields: &[Field],
        spec: &ResponseSpec,
    ) -> Result<Exchange> {
        let mut guard = self.link.lock().map_err(|_| TransactionError::Poisoned)?;
        let link = &mut *guard;

        if link.needs_resync {
            debug!(transport = %link.transport.describe(), "discarding input before request");
            link.transport.discard_input()?;
            link.needs_resync = false;
        }

        let message_id = link.allocate_id();
        let result = execute_exchange(
            &mut link.transport,
            message_id,
            command,
            fields,
            spec,
            &self.config.frame,
        );

        match &result {
            Ok(_) => debug!(message_id, %command, "exchange complete"),
            Err(err) => {
                if err.desynchronizes() {
                    link.needs_resync = true;
                }
                debug!(message_id, %command, error = %err, "exchange failed");
            }
        }
        result
    }

    /// Run one exchange and return the interpreted value.
    pub fn execute(
        &self,
        command: CommandCode,
        fields: &[Field],
        spec: &ResponseSpec,
    ) -> Result<Value> {
        self.exchange(command, fields, spec)
            .map(|exchange| exchange.value)
    }

    /// Read any catalog register. `instance` selects the channel, plan or
    /// bank of indexed registers.
    pub fn read(&self, register: &Register, instance: Option<u8>) -> Result<Value> {
        self.read_exchange(register, instance)
            .map(|exchange| exchange.value)
    }

    /// Like [`Port::read`], keeping the raw bytes.
    pub fn read_exchange(&self, register: &Register, instance: Option<u8>) -> Result<Exchange> {
        if !register.access.readable() {
            return Err(TransactionError::NotReadable(register.name));
        }
        self.exchange(
            CommandCode::Read,
            &[register.read_field(instance)],
            &register.response,
        )
    }

    /// Write raw data bytes to a catalog register.
    pub fn write(
        &self,
        register: &Register,
        instance: Option<u8>,
        data: impl Into<Bytes>,
    ) -> Result<()> {
        let field = register.write_field(instance, data)?;
        self.execute(CommandCode::Write, &[field], &ResponseSpec::ack())
            .map(|_| ())
    }

    /// Run `f` with exclusive access to the transport.
    pub fn with_transport<R>(&self, f: impl FnOnce(&mut T) -> R) -> Result<R> {
        let mut guard = self.link.lock().map_err(|_| TransactionError::Poisoned)?;
        Ok(f(&mut guard.transport))
    }

    pub fn config(&self) -> &PortConfig {
        &self.config
    }

    /// Close the port and return the transport.
    pub fn into_inner(self) -> Result<T> {
        self.link
            .into_inner()
            .map(|link| link.transport)
            .map_err(|_| TransactionError::Poisoned)
    }
}
