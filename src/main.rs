// src/main.rs

#[tokio::main]
async fn main() {
    let argv: Vec<String> = std::env::args().collect();
    let code = pf::run(argv).await;
    std::process::exit(code);
}
