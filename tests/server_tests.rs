//! End-to-end server tests
//!
//! Boot a server on an ephemeral port and drive it with real TCP
//! clients through the wire protocol.

use std::io::{BufReader, BufWriter};
use std::net::{SocketAddr, TcpStream};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::thread::JoinHandle;

use scopekv::network::Server;
use scopekv::protocol::{read_response, write_command, Command, Reply, Response};
use scopekv::{Config, Engine, OwnerId};

struct TestServer {
    addr: SocketAddr,
    shutdown: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl TestServer {
    fn start() -> Self {
        let config = Config::builder()
            .listen_addr("127.0.0.1:0")
            .write_timeout_ms(2000)
            .build();

        let engine = Arc::new(Engine::with_new_store());
        let mut server = Server::bind(config, engine).unwrap();
        let addr = server.local_addr().unwrap();
        let shutdown = server.shutdown_handle();

        let handle = std::thread::spawn(move || {
            let _ = server.run();
        });

        Self {
            addr,
            shutdown,
            handle: Some(handle),
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.store(true, std::sync::atomic::Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

struct Client {
    reader: BufReader<TcpStream>,
    writer: BufWriter<TcpStream>,
}

impl Client {
    fn connect(addr: SocketAddr) -> Self {
        let stream = TcpStream::connect(addr).unwrap();
        stream.set_nodelay(true).unwrap();
        Self {
            reader: BufReader::new(stream.try_clone().unwrap()),
            writer: BufWriter::new(stream),
        }
    }

    fn connect_as(addr: SocketAddr, owner: &str) -> Self {
        let mut client = Self::connect(addr);
        let response = client.send(Command::Hello {
            owner: OwnerId::new(owner),
        });
        assert_eq!(response, Response::Ok(Reply::None));
        client
    }

    fn send(&mut self, command: Command) -> Response {
        write_command(&mut self.writer, &command).unwrap();
        read_response(&mut self.reader).unwrap()
    }
}

// =============================================================================
// End-to-End Flows
// =============================================================================

#[test]
fn test_set_get_remove_over_wire() {
    let server = TestServer::start();
    let mut client = Client::connect_as(server.addr, "u1");

    let response = client.send(Command::Set {
        key: "myKey".to_string(),
        value: "myValue".to_string(),
    });
    assert_eq!(response, Response::Ok(Reply::None));

    let response = client.send(Command::Get {
        key: "myKey".to_string(),
    });
    assert_eq!(response, Response::Ok(Reply::Value("myValue".to_string())));

    let response = client.send(Command::Exists {
        key: "myKey".to_string(),
    });
    assert_eq!(response, Response::Ok(Reply::Flag(true)));

    let response = client.send(Command::Remove {
        key: "myKey".to_string(),
    });
    assert_eq!(response, Response::Ok(Reply::None));

    // Absent key now reads as the empty-string sentinel
    let response = client.send(Command::Get {
        key: "myKey".to_string(),
    });
    assert_eq!(response, Response::Ok(Reply::Value(String::new())));

    // And a second removal reports NOT_FOUND
    let response = client.send(Command::Remove {
        key: "myKey".to_string(),
    });
    assert_eq!(response, Response::NotFound);
}

#[test]
fn test_anonymous_write_rejected_over_wire() {
    let server = TestServer::start();
    let mut client = Client::connect(server.addr);

    let response = client.send(Command::Set {
        key: "key".to_string(),
        value: "value".to_string(),
    });
    assert_eq!(response, Response::Unauthorized);
}

#[test]
fn test_cross_namespace_read_over_wire() {
    let server = TestServer::start();

    let mut writer = Client::connect_as(server.addr, "u1");
    let response = writer.send(Command::Set {
        key: "publicKey".to_string(),
        value: "publicValue".to_string(),
    });
    assert_eq!(response, Response::Ok(Reply::None));

    // A different client reads u1's namespace without any identity
    let mut reader = Client::connect(server.addr);
    let response = reader.send(Command::GetFrom {
        owner: OwnerId::new("u1"),
        key: "publicKey".to_string(),
    });
    assert_eq!(
        response,
        Response::Ok(Reply::Value("publicValue".to_string()))
    );

    // But cannot write into it
    let response = reader.send(Command::Set {
        key: "publicKey".to_string(),
        value: "overwritten".to_string(),
    });
    assert_eq!(response, Response::Unauthorized);
}

#[test]
fn test_enumeration_and_pagination_over_wire() {
    let server = TestServer::start();
    let mut client = Client::connect_as(server.addr, "u1");

    for i in 0..10 {
        let response = client.send(Command::Set {
            key: format!("key{}", i),
            value: format!("value{}", i),
        });
        assert_eq!(response, Response::Ok(Reply::None));
    }

    let response = client.send(Command::Count);
    assert_eq!(response, Response::Ok(Reply::Count(10)));

    let response = client.send(Command::Page {
        offset: 0,
        limit: 5,
    });
    match response {
        Response::Ok(Reply::Page(page)) => {
            assert_eq!(page.keys.len(), 5);
            assert!(page.has_more);
        }
        other => panic!("Expected page, got {:?}", other),
    }

    let response = client.send(Command::Page {
        offset: 7,
        limit: 10,
    });
    match response {
        Response::Ok(Reply::Page(page)) => {
            assert_eq!(page.keys.len(), 3);
            assert!(!page.has_more);
        }
        other => panic!("Expected page, got {:?}", other),
    }

    // The same index is visible to anonymous clients via the For forms
    let mut observer = Client::connect(server.addr);
    let response = observer.send(Command::CountFor {
        owner: OwnerId::new("u1"),
    });
    assert_eq!(response, Response::Ok(Reply::Count(10)));
}

#[test]
fn test_ping_over_wire() {
    let server = TestServer::start();
    let mut client = Client::connect(server.addr);

    assert_eq!(client.send(Command::Ping), Response::Ok(Reply::Pong));
}

#[test]
fn test_identity_rebinding_switches_namespace() {
    let server = TestServer::start();
    let mut client = Client::connect_as(server.addr, "u1");

    let response = client.send(Command::Set {
        key: "key".to_string(),
        value: "from-u1".to_string(),
    });
    assert_eq!(response, Response::Ok(Reply::None));

    // Re-identify as u2 on the same connection
    let response = client.send(Command::Hello {
        owner: OwnerId::new("u2"),
    });
    assert_eq!(response, Response::Ok(Reply::None));

    let response = client.send(Command::Get {
        key: "key".to_string(),
    });
    assert_eq!(response, Response::Ok(Reply::Value(String::new())));
}
