#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    certificados_laborales::run().await
}
