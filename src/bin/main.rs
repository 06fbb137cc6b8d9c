use acm_cert_exporter::env;

#[derive(clap::Parser)]
#[command(version, about)]
struct Cli {
    /// Destination S3 bucket
    #[arg(short = 'b', long, env = "S3_BUCKET")]
    bucket: Option<String>,

    /// Where to take the certificate from
    #[arg(
        short = 's',
        long,
        value_enum,
        ignore_case = true,
        env = "CERTIFICATE_SOURCE"
    )]
    source: Option<SourceArg>,

    /// ACM certificate ARN
    #[arg(long, value_name = "ARN", env = "CERTIFICATE_ARN")]
    certificate_arn: Option<String>,

    /// Directory holding cert.pem, key.pem and chain.pem
    #[arg(long, value_name = "DIR", env = "CERTIFICATE_DIR")]
    certificate_dir: Option<std::path::PathBuf>,

    /// Root CA certificate to upload as root_ca_cert.pem
    #[arg(long, value_name = "PEM FILE", env = "ROOT_CA_FILE")]
    root_ca_file: Option<std::path::PathBuf>,

    /// AWS region, e.g. us-east-1
    #[arg(long, env = "AWS_REGION")]
    region: Option<String>,

    /// Write objects under this directory instead of S3
    #[arg(long, value_name = "DIR")]
    out_dir: Option<std::path::PathBuf>,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum SourceArg {
    Acm,
    Env,
    File,
}

impl SourceArg {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Acm => "acm",
            Self::Env => "env",
            Self::File => "file",
        }
    }
}

impl Cli {
    /// Process environment with the parsed options on top.
    /// PASSPHRASE and PEM bodies are only taken from the environment.
    fn vars(&self) -> Vec<(String, String)> {
        let mut vars = acm_cert_exporter::env_vars()
            .collect::<std::collections::HashMap<_, _>>();
        let path_str = |p: &std::path::PathBuf| p.to_string_lossy().into_owned();

        let overrides = [
            (env::S3_BUCKET, self.bucket.clone()),
            (
                env::CERTIFICATE_SOURCE,
                self.source.map(|s| s.as_str().to_string()),
            ),
            (env::CERTIFICATE_ARN, self.certificate_arn.clone()),
            (env::CERTIFICATE_DIR, self.certificate_dir.as_ref().map(path_str)),
            (env::ROOT_CA_FILE, self.root_ca_file.as_ref().map(path_str)),
        ];
        for (name, value) in overrides {
            if let Some(value) = value {
                vars.insert(name.to_string(), value);
            }
        }
        vars.into_iter().collect()
    }
}

/// main() for generic environment
#[tokio::main]
async fn main() -> std::process::ExitCode {
    use acm_cert_exporter::*;
    use clap::Parser;

    let cli = Cli::parse();
    init_logging();

    let aws_sdk_config = aws_config_from_env(cli.region.clone()).await;
    let exporter = AcmExporter::new(&aws_sdk_config);

    let resp = if let Some(out_dir) = &cli.out_dir {
        handle(cli.vars(), &exporter, &LocalDirStore::new(out_dir)).await
    } else {
        handle(cli.vars(), &exporter, &S3Store::new(&aws_sdk_config)).await
    };

    println!("{}", resp.body);
    if resp.is_success() {
        std::process::ExitCode::SUCCESS
    } else {
        std::process::ExitCode::FAILURE
    }
}
