use lambda_runtime::{Error, LambdaEvent, run, service_fn};
use serde_json::Value;
use trumpify::api::{ApiState, handler};

#[tokio::main]
async fn main() -> Result<(), Error> {
    trumpify::setup_logging();

    let state = ApiState::from_env().await;
    let state = &state;
    run(service_fn(move |event: LambdaEvent<Value>| async move {
        handler(state, event).await
    }))
    .await
}
