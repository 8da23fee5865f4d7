//! Serve command - run the stdio JSON-RPC server

use anyhow::Result;
use std::path::Path;

use crate::config::Config;
use crate::index::SemanticIndexer;
use crate::server::Server;

pub async fn run(config: Config, base_dir: &Path) -> Result<()> {
    let indexer = SemanticIndexer::new(base_dir.to_path_buf(), &config.index, config.search);
    let mut server = Server::new(indexer);
    server.serve_stdio().await
}
