//! A scripted in-process `ThriftHive` server.
//!
//! Accepts one connection and answers one call per scripted reply, then
//! hangs up. The calls it received are returned from `join`.

use std::net::{TcpListener, TcpStream};
use std::thread::{self, JoinHandle};

use thrift::protocol::{
    TBinaryInputProtocol, TBinaryOutputProtocol, TFieldIdentifier, TInputProtocol,
    TListIdentifier, TMessageIdentifier, TMessageType, TOutputProtocol, TStructIdentifier, TType,
};

/// How the server answers one call.
pub enum Reply {
    /// Void success (for `execute`).
    Done,
    /// A `list<string>` success value.
    Rows(Vec<String>),
    /// A `list<string>` success value given as raw bytes per row.
    RawRows(Vec<Vec<u8>>),
    /// A `HiveServerException` with the given message.
    Fail(String),
}

/// A call as the server saw it: method name and its single argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceivedCall {
    pub name: String,
    pub arg: Option<String>,
}

pub struct FakeHiveServer {
    pub port: u16,
    handle: JoinHandle<thrift::Result<Vec<ReceivedCall>>>,
}

impl FakeHiveServer {
    pub fn start(script: Vec<Reply>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();

        let handle = thread::spawn(move || {
            let (stream, _) = listener.accept()?;
            serve(stream, script)
        });

        Self { port, handle }
    }

    /// Waits for the script to finish and returns the calls received.
    pub fn join(self) -> Vec<ReceivedCall> {
        self.handle
            .join()
            .expect("fake server panicked")
            .expect("fake server failed")
    }
}

fn serve(stream: TcpStream, script: Vec<Reply>) -> thrift::Result<Vec<ReceivedCall>> {
    let mut i_prot = TBinaryInputProtocol::new(stream.try_clone()?, true);
    let mut o_prot = TBinaryOutputProtocol::new(stream, true);
    let mut calls = Vec::new();

    for reply in script {
        let message_ident = i_prot.read_message_begin()?;
        let arg = read_args(&mut i_prot)?;
        i_prot.read_message_end()?;

        write_reply(
            &mut o_prot,
            &message_ident.name,
            message_ident.sequence_number,
            &reply,
        )?;
        calls.push(ReceivedCall {
            name: message_ident.name,
            arg,
        });
    }

    Ok(calls)
}

fn read_args(i_prot: &mut dyn TInputProtocol) -> thrift::Result<Option<String>> {
    i_prot.read_struct_begin()?;
    let mut arg = None;
    loop {
        let field_ident = i_prot.read_field_begin()?;
        if field_ident.field_type == TType::Stop {
            break;
        }
        match field_ident.field_type {
            TType::String => arg = Some(i_prot.read_string()?),
            TType::I32 => arg = Some(i_prot.read_i32()?.to_string()),
            other => i_prot.skip(other)?,
        }
        i_prot.read_field_end()?;
    }
    i_prot.read_struct_end()?;
    Ok(arg)
}

fn write_reply(
    o_prot: &mut dyn TOutputProtocol,
    name: &str,
    sequence_number: i32,
    reply: &Reply,
) -> thrift::Result<()> {
    o_prot.write_message_begin(&TMessageIdentifier::new(
        name,
        TMessageType::Reply,
        sequence_number,
    ))?;
    o_prot.write_struct_begin(&TStructIdentifier::new(format!("{name}_result")))?;

    match reply {
        Reply::Done => {}
        Reply::Rows(rows) => {
            o_prot.write_field_begin(&TFieldIdentifier::new("success", TType::List, 0))?;
            o_prot.write_list_begin(&TListIdentifier::new(TType::String, rows.len() as i32))?;
            for row in rows {
                o_prot.write_string(row)?;
            }
            o_prot.write_list_end()?;
            o_prot.write_field_end()?;
        }
        Reply::RawRows(rows) => {
            o_prot.write_field_begin(&TFieldIdentifier::new("success", TType::List, 0))?;
            o_prot.write_list_begin(&TListIdentifier::new(TType::String, rows.len() as i32))?;
            for row in rows {
                o_prot.write_bytes(row)?;
            }
            o_prot.write_list_end()?;
            o_prot.write_field_end()?;
        }
        Reply::Fail(message) => {
            o_prot.write_field_begin(&TFieldIdentifier::new("ex", TType::Struct, 1))?;
            o_prot.write_struct_begin(&TStructIdentifier::new("HiveServerException"))?;
            o_prot.write_field_begin(&TFieldIdentifier::new("message", TType::String, 1))?;
            o_prot.write_string(message)?;
            o_prot.write_field_end()?;
            o_prot.write_field_begin(&TFieldIdentifier::new("errorCode", TType::I32, 2))?;
            o_prot.write_i32(10001)?;
            o_prot.write_field_end()?;
            o_prot.write_field_begin(&TFieldIdentifier::new("SQLState", TType::String, 3))?;
            o_prot.write_string("42S02")?;
            o_prot.write_field_end()?;
            o_prot.write_field_stop()?;
            o_prot.write_struct_end()?;
            o_prot.write_field_end()?;
        }
    }

    o_prot.write_field_stop()?;
    o_prot.write_struct_end()?;
    o_prot.write_message_end()?;
    o_prot.flush()
}
