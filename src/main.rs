use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    quill::run().await
}
