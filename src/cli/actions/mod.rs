pub mod server;

#[derive(Debug)]
pub enum Action {
    Server {
        port: u16,
        realm: String,
        nonce_ttl_seconds: u64,
    },
}
