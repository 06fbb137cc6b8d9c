/// main() for AWS Lambda
#[tokio::main]
async fn main() -> Result<(), lambda_runtime::Error> {
    use acm_cert_exporter::{aws_config_from_env, init_logging, AcmExporter, S3Store};
    use lambda_runtime::{run, service_fn};

    init_logging();

    // AWS clients are created once per cold start and reused across invocations
    let aws_sdk_config = aws_config_from_env(None).await;
    let exporter = AcmExporter::new(&aws_sdk_config);
    let store = S3Store::new(&aws_sdk_config);

    run(service_fn(|event| lambda_handler(event, &exporter, &store))).await?;
    Ok(())
}

/// Lambda handler, event payload is not used
async fn lambda_handler(
    _event: lambda_runtime::LambdaEvent<serde_json::Value>,
    exporter: &acm_cert_exporter::AcmExporter,
    store: &acm_cert_exporter::S3Store,
) -> Result<acm_cert_exporter::HandlerResponse, lambda_runtime::Error> {
    // Configuration is read fresh on every invocation
    Ok(acm_cert_exporter::handle(acm_cert_exporter::env_vars(), exporter, store).await)
}
