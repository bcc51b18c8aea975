use civil_watch_api::run;

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("civil-watch error: {err}");
        std::process::exit(1);
    }
}
