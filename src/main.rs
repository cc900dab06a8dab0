#[tokio::main]
async fn main() -> anyhow::Result<()> {
    centavo_api::cli::run_with_sys_args().await
}
