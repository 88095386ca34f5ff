// crates/cli/src/session.rs

//! SSH session establishment for the remote side.

use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use ssh2::{Session, Sftp};

use crate::CliError;

pub(crate) struct Credentials<'a> {
    pub(crate) user: String,
    pub(crate) password: Option<&'a str>,
}

/// Open an authenticated SFTP channel to `host`.
pub(crate) fn connect(
    host: &str,
    port: u16,
    credentials: &Credentials<'_>,
    timeout: Duration,
) -> Result<(Session, Sftp), CliError> {
    let addrs = (host, port)
        .to_socket_addrs()
        .map_err(|e| CliError::Connect(format!("could not resolve \"{host}\": {e}")))?;

    let mut tcp = None;
    let mut last_err = None;
    for addr in addrs {
        match TcpStream::connect_timeout(&addr, timeout) {
            Ok(stream) => {
                tcp = Some(stream);
                break;
            }
            Err(e) => last_err = Some(e),
        }
    }
    let tcp = tcp.ok_or_else(|| match last_err {
        Some(e) => CliError::Connect(format!("could not reach {host}:{port}: {e}")),
        None => CliError::Connect(format!("\"{host}\" did not resolve to any address")),
    })?;

    let mut session =
        Session::new().map_err(|e| CliError::Connect(format!("SSH setup failed: {e}")))?;
    session.set_tcp_stream(tcp);
    session
        .handshake()
        .map_err(|e| CliError::Connect(format!("SSH handshake with {host} failed: {e}")))?;

    match credentials.password {
        Some(password) => session.userauth_password(&credentials.user, password),
        None => session.userauth_agent(&credentials.user),
    }
    .map_err(|e| {
        CliError::Connect(format!(
            "authentication as {} on {host} failed: {e}",
            credentials.user
        ))
    })?;
    if !session.authenticated() {
        return Err(CliError::Connect(format!(
            "authentication as {} on {host} was rejected",
            credentials.user
        )));
    }

    let sftp = session
        .sftp()
        .map_err(|e| CliError::Connect(format!("opening an SFTP channel on {host} failed: {e}")))?;
    Ok((session, sftp))
}
