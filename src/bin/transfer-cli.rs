use clap::{Parser, Subcommand};
use futures_util::future::try_join_all;
use transfer_harness::workload::{generate, verifier};
use url::Url;

type CliResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

#[derive(Parser)]
#[command(name = "transfer-cli")]
#[command(about = "Drive and verify a running transfer harness", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://127.0.0.1:8080")]
    url: Url,

    /// Accept self-signed certificates.
    #[arg(short = 'k', long)]
    insecure: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch /hello
    Hello,
    /// Download /prdata `num` times concurrently and verify each body
    Download {
        #[arg(long)]
        len: usize,
        #[arg(long, default_value_t = 1)]
        num: usize,
    },
    /// Upload the sequence to /uploadhandler `num` times concurrently
    Upload {
        #[arg(long)]
        len: usize,
        #[arg(long, default_value_t = 1)]
        num: usize,
    },
    /// Round-trip the sequence through /echo
    Echo {
        #[arg(long)]
        len: usize,
    },
    /// Fetch /data and optionally compare its BLAKE3 digest
    Data {
        #[arg(long)]
        expect_digest: Option<String>,
    },
}

fn endpoint(base: &Url, path: &str, len: Option<usize>) -> CliResult<Url> {
    let mut url = base.join(path)?;
    if let Some(len) = len {
        url.query_pairs_mut().append_pair("len", &len.to_string());
    }
    Ok(url)
}

#[tokio::main]
async fn main() -> CliResult<()> {
    let cli = Cli::parse();
    let client = reqwest::Client::builder()
        .danger_accept_invalid_certs(cli.insecure)
        .build()?;

    match cli.command {
        Commands::Hello => {
            let res = client
                .get(endpoint(&cli.url, "/hello", None)?)
                .send()
                .await?
                .error_for_status()?;
            print!("{}", res.text().await?);
        }
        Commands::Download { len, num } => {
            let url = endpoint(&cli.url, "/prdata", Some(len))?;
            let requests = (0..num).map(|_| {
                let client = client.clone();
                let url = url.clone();
                async move {
                    let body = client.get(url).send().await?.error_for_status()?.bytes().await?;
                    verifier::verify(len, &body)?;
                    CliResult::Ok(())
                }
            });
            try_join_all(requests).await?;
            println!("dltest ok: {num} x {len} bytes verified");
        }
        Commands::Upload { len, num } => {
            let url = endpoint(&cli.url, "/uploadhandler", Some(len))?;
            let payload = generate(len);
            let requests = (0..num).map(|_| {
                let request = client.post(url.clone()).body(payload.clone());
                async move {
                    let res = request.send().await?;
                    let status = res.status();
                    if !status.is_success() {
                        let reason = res.text().await.unwrap_or_default();
                        return Err(format!("upload rejected ({status}): {reason}").into());
                    }
                    CliResult::Ok(())
                }
            });
            try_join_all(requests).await?;
            println!("uploaded {num} x {len} bytes");
        }
        Commands::Echo { len } => {
            let body = client
                .post(endpoint(&cli.url, "/echo", None)?)
                .body(generate(len))
                .send()
                .await?
                .error_for_status()?
                .bytes()
                .await?;
            verifier::verify(len, &body)?;
            println!("echo ok: {len} bytes");
        }
        Commands::Data { expect_digest } => {
            let body = client
                .get(endpoint(&cli.url, "/data", None)?)
                .send()
                .await?
                .error_for_status()?
                .bytes()
                .await?;
            let digest = blake3::hash(&body).to_hex().to_string();
            println!("{} bytes, blake3 {digest}", body.len());
            if let Some(expected) = expect_digest {
                if !expected.eq_ignore_ascii_case(&digest) {
                    return Err(format!("digest mismatch: expected {expected}").into());
                }
            }
        }
    }

    Ok(())
}
