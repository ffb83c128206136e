//! HiveServer client over Thrift.
//!
//! Provides the `ThriftHiveClient` struct that implements the `HiveClient`
//! trait for the `ThriftHive` service: a TCP socket wrapped in buffered
//! transports and the binary protocol.

use std::io;
use std::net::{Shutdown, TcpStream, ToSocketAddrs};
use std::time::Duration;

use thrift::protocol::{
    verify_expected_message_type, verify_expected_sequence_number, verify_expected_service_call,
    TBinaryInputProtocol, TBinaryOutputProtocol, TFieldIdentifier, TInputProtocol,
    TMessageIdentifier, TMessageType, TOutputProtocol, TStructIdentifier, TType,
};
use thrift::transport::{
    ReadHalf, TBufferedReadTransport, TBufferedWriteTransport, TIoChannel, TTcpChannel, WriteHalf,
};
use thrift::{ApplicationError, ApplicationErrorKind};
use tracing::debug;

use crate::config::ConnectionConfig;
use crate::db::{split_row, Connector, HiveClient, HiveServerException, Row};
use crate::error::{BoxError, HiveError, Result};

type InputProtocol = TBinaryInputProtocol<TBufferedReadTransport<ReadHalf<TTcpChannel>>>;
type OutputProtocol = TBinaryOutputProtocol<TBufferedWriteTransport<WriteHalf<TTcpChannel>>>;

type CallResult<T> = std::result::Result<T, BoxError>;

/// Client for the HiveServer `ThriftHive` service.
pub struct ThriftHiveClient {
    i_prot: InputProtocol,
    o_prot: OutputProtocol,
    sequence_number: i32,
    /// Handle on the socket kept for shutdown; `None` once closed.
    stream: Option<TcpStream>,
    address: String,
}

impl ThriftHiveClient {
    /// Opens a session to the server named by `config`.
    pub fn connect(config: &ConnectionConfig) -> Result<Self> {
        config.validate()?;
        let address = config.address();
        debug!("Opening Thrift transport to {}", address);

        let client = Self::open(config).map_err(|e| HiveError::connection(address.clone(), e))?;

        debug!("Thrift transport to {} is open", address);
        Ok(client)
    }

    fn open(config: &ConnectionConfig) -> CallResult<Self> {
        let stream = open_stream(config.host(), config.port(), config.connect_timeout())?;
        stream.set_read_timeout(config.fetch_timeout())?;
        stream.set_nodelay(true)?;

        let shutdown_handle = stream.try_clone()?;
        let (read_half, write_half) = TTcpChannel::with_stream(stream).split()?;

        Ok(Self {
            // Servers may answer with or without the version header.
            i_prot: TBinaryInputProtocol::new(TBufferedReadTransport::new(read_half), false),
            o_prot: TBinaryOutputProtocol::new(TBufferedWriteTransport::new(write_half), true),
            sequence_number: 0,
            stream: Some(shutdown_handle),
            address: config.address(),
        })
    }

    fn ensure_open(&self) -> CallResult<()> {
        if self.stream.is_none() {
            return Err(format!("transport to {} is closed", self.address).into());
        }
        Ok(())
    }

    fn begin_call(&mut self, name: &str) -> CallResult<()> {
        self.ensure_open()?;
        self.sequence_number += 1;
        let message_ident = TMessageIdentifier::new(name, TMessageType::Call, self.sequence_number);
        self.o_prot.write_message_begin(&message_ident)?;
        self.o_prot
            .write_struct_begin(&TStructIdentifier::new(format!("{name}_args")))?;
        Ok(())
    }

    fn end_call(&mut self) -> CallResult<()> {
        self.o_prot.write_field_stop()?;
        self.o_prot.write_struct_end()?;
        self.o_prot.write_message_end()?;
        self.o_prot.flush()?;
        Ok(())
    }

    /// Reads the reply to `name`, returning its `success` list if present.
    fn recv_reply(&mut self, name: &str) -> CallResult<Option<Vec<Vec<u8>>>> {
        let message_ident = self.i_prot.read_message_begin()?;
        verify_expected_sequence_number(self.sequence_number, message_ident.sequence_number)?;
        verify_expected_service_call(name, &message_ident.name)?;

        if message_ident.message_type == TMessageType::Exception {
            let remote_error =
                thrift::Error::read_application_error_from_in_protocol(&mut self.i_prot)?;
            self.i_prot.read_message_end()?;
            return Err(Box::new(thrift::Error::Application(remote_error)));
        }
        verify_expected_message_type(TMessageType::Reply, message_ident.message_type)?;

        let (success, ex) = read_result(&mut self.i_prot)?;
        self.i_prot.read_message_end()?;

        match ex {
            Some(ex) => Err(Box::new(ex)),
            None => Ok(success),
        }
    }

    fn call_execute(&mut self, query: &str) -> CallResult<()> {
        self.begin_call("execute")?;
        self.o_prot
            .write_field_begin(&TFieldIdentifier::new("query", TType::String, 1))?;
        self.o_prot.write_string(query)?;
        self.o_prot.write_field_end()?;
        self.end_call()?;
        self.recv_reply("execute")?;
        Ok(())
    }

    fn call_fetch_n(&mut self, num_rows: i32) -> CallResult<Vec<Vec<u8>>> {
        self.begin_call("fetchN")?;
        self.o_prot
            .write_field_begin(&TFieldIdentifier::new("numRows", TType::I32, 1))?;
        self.o_prot.write_i32(num_rows)?;
        self.o_prot.write_field_end()?;
        self.end_call()?;
        self.recv_reply("fetchN")?
            .ok_or_else(|| missing_result("fetchN"))
    }

    fn call_fetch_all(&mut self) -> CallResult<Vec<Vec<u8>>> {
        self.begin_call("fetchAll")?;
        self.end_call()?;
        self.recv_reply("fetchAll")?
            .ok_or_else(|| missing_result("fetchAll"))
    }
}

impl HiveClient for ThriftHiveClient {
    fn execute(&mut self, query: &str) -> Result<()> {
        self.call_execute(query)
            .map_err(HiveError::remote_execution)
    }

    fn fetch_all(&mut self) -> Result<Vec<Row>> {
        let lines = self
            .call_fetch_all()
            .map_err(HiveError::remote_execution)?;
        debug!("fetchAll returned {} rows", lines.len());
        Ok(lines.iter().map(|line| split_row(line)).collect())
    }

    fn fetch_n(&mut self, num_rows: i32) -> Result<Vec<Row>> {
        let lines = self
            .call_fetch_n(num_rows)
            .map_err(HiveError::remote_execution)?;
        debug!("fetchN({}) returned {} rows", num_rows, lines.len());
        Ok(lines.iter().map(|line| split_row(line)).collect())
    }

    fn close(&mut self) -> Result<()> {
        if let Some(stream) = self.stream.take() {
            debug!("Closing Thrift transport to {}", self.address);
            match stream.shutdown(Shutdown::Both) {
                Ok(()) => {}
                // The peer already went away.
                Err(e) if e.kind() == io::ErrorKind::NotConnected => {}
                Err(e) => return Err(HiveError::Io(e)),
            }
        }
        Ok(())
    }
}

/// Opens `ThriftHiveClient` sessions.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThriftConnector;

impl Connector for ThriftConnector {
    fn open(&self, config: &ConnectionConfig) -> Result<Box<dyn HiveClient>> {
        Ok(Box::new(ThriftHiveClient::connect(config)?))
    }
}

/// Connects to the first reachable address `host:port` resolves to.
fn open_stream(host: &str, port: u16, timeout: Option<Duration>) -> io::Result<TcpStream> {
    let Some(timeout) = timeout else {
        return TcpStream::connect((host, port));
    };

    let mut last_error = None;
    for addr in (host, port).to_socket_addrs()? {
        match TcpStream::connect_timeout(&addr, timeout) {
            Ok(stream) => return Ok(stream),
            Err(e) => last_error = Some(e),
        }
    }

    Err(last_error.unwrap_or_else(|| {
        io::Error::new(
            io::ErrorKind::NotFound,
            format!("{host}:{port} did not resolve to any address"),
        )
    }))
}

fn missing_result(call: &str) -> BoxError {
    Box::new(thrift::Error::Application(ApplicationError::new(
        ApplicationErrorKind::MissingResult,
        format!("{call} failed: unknown result"),
    )))
}

/// Reads a `<call>_result` struct: field 0 is the `list<string>` success
/// value, field 1 the `HiveServerException`.
fn read_result(
    i_prot: &mut dyn TInputProtocol,
) -> thrift::Result<(Option<Vec<Vec<u8>>>, Option<HiveServerException>)> {
    i_prot.read_struct_begin()?;
    let mut success = None;
    let mut ex = None;
    loop {
        let field_ident = i_prot.read_field_begin()?;
        if field_ident.field_type == TType::Stop {
            break;
        }
        match (field_ident.id, field_ident.field_type) {
            (Some(0), TType::List) => success = Some(read_row_list(i_prot)?),
            (Some(1), TType::Struct) => ex = Some(read_hive_server_exception(i_prot)?),
            (_, field_type) => i_prot.skip(field_type)?,
        }
        i_prot.read_field_end()?;
    }
    i_prot.read_struct_end()?;
    Ok((success, ex))
}

/// Reads the row strings as raw bytes; rows are not required to be UTF-8.
fn read_row_list(i_prot: &mut dyn TInputProtocol) -> thrift::Result<Vec<Vec<u8>>> {
    let list_ident = i_prot.read_list_begin()?;
    let mut values = Vec::with_capacity(list_ident.size.max(0) as usize);
    for _ in 0..list_ident.size {
        values.push(i_prot.read_bytes()?);
    }
    i_prot.read_list_end()?;
    Ok(values)
}

fn read_hive_server_exception(
    i_prot: &mut dyn TInputProtocol,
) -> thrift::Result<HiveServerException> {
    i_prot.read_struct_begin()?;
    let mut ex = HiveServerException::default();
    loop {
        let field_ident = i_prot.read_field_begin()?;
        if field_ident.field_type == TType::Stop {
            break;
        }
        match (field_ident.id, field_ident.field_type) {
            (Some(1), TType::String) => ex.message = i_prot.read_string()?,
            (Some(2), TType::I32) => ex.error_code = i_prot.read_i32()?,
            (Some(3), TType::String) => ex.sql_state = i_prot.read_string()?,
            (_, field_type) => i_prot.skip(field_type)?,
        }
        i_prot.read_field_end()?;
    }
    i_prot.read_struct_end()?;
    Ok(ex)
}
