//! Common test utilities for reqtester CLI tests

#![allow(dead_code)]

use std::net::SocketAddr;

use assert_cmd::Command;

/// Start the mock backend on a random port and return its address.
pub fn start_mock_server() -> SocketAddr {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });

    addr
}

/// `reqtester` pointed at `addr`, with the environment cleared of overrides.
pub fn reqtester(addr: SocketAddr) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_reqtester"));
    cmd.env_remove("REQTESTER_SCHEME")
        .env_remove("REQTESTER_ANONYMOUS_AUTH")
        .env_remove("RUST_LOG")
        .env("REQTESTER_HOST", addr.to_string());
    cmd
}

/// Log in as `user` through the form and return the script line for it.
pub fn login_line(user: &str) -> String {
    format!(r#"POST /api/auth/token/ {{"username": "{user}", "password": "secret"}}"#)
}
