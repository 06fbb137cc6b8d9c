/// Set region as "us-east-1", etc. or None for default region
pub async fn aws_config_from_env(region: Option<String>) -> aws_config::SdkConfig {
    if let Some(region) = region {
        // Specified region
        aws_config::from_env()
            .region(aws_config::Region::new(region))
            .load()
            .await
    } else {
        // default region, AWS_REGION on Lambda
        aws_config::from_env().load().await
    }
}
