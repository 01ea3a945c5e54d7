use renderstore_lib::cli::status::{handle_status, StatusArgs};
use renderstore_lib::config::AppConfig;
use renderstore_lib::store::StoreSession;
use tokio::runtime::Runtime;

// Exercises the real connect-and-count path when a store is running on the
// default local ports, and otherwise checks that connecting fails with the
// fixed liveness message.
#[test]
fn test_status_against_local_store_if_available() {
    let rt = Runtime::new().unwrap();
    rt.block_on(async {
        let config = AppConfig::default();

        let session = match StoreSession::connect(&config).await {
            Ok(session) => session,
            Err(e) => {
                assert_eq!(e.to_string(), "vector store is not live");
                println!("Skipping live status check: {}", e);
                return;
            }
        };

        let args = StatusArgs { json: false };
        if let Err(e) = handle_status(&args, &config, session.client()).await {
            panic!("Unexpected error against a live store: {}", e);
        }
    });
}
