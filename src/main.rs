#[actix_web::main]
async fn main() -> std::io::Result<()> {
    numerologija_server::run().await
}
