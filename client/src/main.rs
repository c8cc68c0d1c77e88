// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

use std::backtrace::BacktraceStatus;

use clap::Parser;
use skr_client::configuration::{ClientArgs, ClientOptions, SkrConfig, usage};
use skr_client::invoker::SkrClient;
use skr_client::logging;
use skr_client::models::Operation;

fn parse_operation() -> Operation {
    match ClientArgs::try_parse() {
        Ok(args) => args.operation,
        Err(_) => {
            println!("{}", usage());
            std::process::exit(1);
        }
    }
}

async fn run(options: ClientOptions, operation: Operation) -> anyhow::Result<String> {
    let config = SkrConfig::from_options(options)?;
    let client = SkrClient::new(config);
    let result = client.run(operation).await?;
    Ok(result)
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let operation = parse_operation();
    let options = match ClientOptions::from_env() {
        Ok(options) => options,
        Err(err) => {
            println!("Erreur: {err}");
            std::process::exit(1);
        }
    };
    let debug = options.debug;

    logging::init(debug, options.log_json);

    match run(options, operation).await {
        Ok(result) => println!("{}", operation.result_line(&result)),
        Err(err) => {
            println!("Erreur: {err}");
            if debug {
                eprintln!("{err:#?}");
                if err.backtrace().status() == BacktraceStatus::Captured {
                    eprintln!("{}", err.backtrace());
                }
            }
            std::process::exit(1);
        }
    }
}
