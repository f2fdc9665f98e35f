use actix_web::HttpServer;
use palisade::create_base_app;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Initialize logger (make sure to run with RUST_LOG=info, for example)
    env_logger::init();

    // Print a startup message for convenience.
    println!("Server running at http://127.0.0.1:8080");

    HttpServer::new(create_base_app)
        .bind("127.0.0.1:8080")?
        .run()
        .await
}
