use fincalc::config::Config;
use fincalc::models::price::Interval;
use fincalc::models::roi::{ScenarioResult, Targets};
use fincalc::services::calculator_service::{CalculatorService, RoiRequest};
use fincalc::session::Session;
use fincalc::util;

use anyhow::{anyhow, bail, Context};
use clap::{App, Arg, ArgMatches, SubCommand};
use chrono::Duration;
use log::{error, info};
use serde::Serialize;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 先加载 .env，再初始化日志
    dotenvy::dotenv().ok();
    env_logger::init();

    let today = chrono::Local::now().date_naive();
    let today_str = today.format("%Y-%m-%d").to_string();
    let next_week_str = (today + Duration::days(7)).format("%Y-%m-%d").to_string();

    let app = App::new("fincalc")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Leveraged ROI projections and historical price analysis")
        .arg(
            Arg::with_name("json")
                .long("json")
                .global(true)
                .help("Print results as JSON")
                .takes_value(false),
        );

    let app = app
        .subcommand(with_event_args(
            SubCommand::with_name("roi")
                .about("Calculate leveraged ROI for one or three target prices")
                .arg(number_arg("price", "Current price").required(true))
                .arg(number_arg("target", "Forecasted price").conflicts_with_all(&["low", "average", "high"]))
                .arg(number_arg("low", "Low analyst target").requires_all(&["average", "high"]))
                .arg(number_arg("average", "Average analyst target").requires_all(&["low", "high"]))
                .arg(number_arg("high", "High analyst target").requires_all(&["low", "average"]))
                .arg(number_arg("investment", "Initial investment").default_value("1000"))
                .arg(number_arg("leverage", "Leverage multiplier").default_value("2"))
                .arg(number_arg("impact", "Event impact percent applied to every target").allow_hyphen_values(true))
                .arg(
                    Arg::with_name("event-symbol")
                        .long("event-symbol")
                        .value_name("SYMBOL")
                        .help("Derive the event impact from this symbol's reaction to --event-time")
                        .takes_value(true)
                        .requires("event-time"),
                )
                .arg(
                    Arg::with_name("event-time")
                        .long("event-time")
                        .value_name("TIME")
                        .help("Event time, YYYY-MM-DD HH:MM or RFC 3339")
                        .takes_value(true)
                        .requires("event-symbol"),
                ),
        ))
        .subcommand(
            SubCommand::with_name("history")
                .about("Summarize historical daily returns")
                .arg(symbol_arg().default_value("AAPL"))
                .arg(
                    Arg::with_name("start")
                        .long("start")
                        .value_name("DATE")
                        .help("Start date (YYYY-MM-DD, inclusive)")
                        .takes_value(true)
                        .default_value("2022-01-01"),
                )
                .arg(
                    Arg::with_name("end")
                        .long("end")
                        .value_name("DATE")
                        .help("End date (YYYY-MM-DD, exclusive)")
                        .takes_value(true)
                        .default_value("2023-01-01"),
                ),
        )
        .subcommand(with_event_args(
            SubCommand::with_name("event")
                .about("Measure the price reaction around a macroeconomic event")
                .arg(symbol_arg().required(true))
                .arg(
                    Arg::with_name("time")
                        .short('t')
                        .long("time")
                        .value_name("TIME")
                        .help("Event time, YYYY-MM-DD HH:MM or RFC 3339")
                        .required(true)
                        .takes_value(true),
                ),
        ))
        .subcommand(
            SubCommand::with_name("calendar")
                .about("List economic calendar events")
                .arg(
                    Arg::with_name("from")
                        .long("from")
                        .value_name("DATE")
                        .takes_value(true)
                        .default_value(&today_str),
                )
                .arg(
                    Arg::with_name("to")
                        .long("to")
                        .value_name("DATE")
                        .takes_value(true)
                        .default_value(&next_week_str),
                ),
        );

    let matches = app.get_matches();
    let json = matches.is_present("json");

    let config = Config::from_env()?;
    let service = CalculatorService::from_config(config)?;
    let mut session = Session::new();

    if let Some(matches) = matches.subcommand_matches("roi") {
        if let Some(symbol) = matches.value_of("event-symbol") {
            let tz = util::parse_timezone(matches.value_of("tz").unwrap_or("UTC"))?;
            let raw_time = matches.value_of("event-time").unwrap_or_default();
            let event_time = util::parse_event_time(raw_time, &tz)?;
            let interval: Interval = matches.value_of("interval").unwrap_or("5m").parse()?;

            match service.event_workflow(&mut session, symbol, event_time, interval).await {
                Some(sample) => info!("Event impact {}% taken from {}", sample.change_at_offset_2_pct, symbol),
                None => error!("No event impact available for {}, using 0%", symbol),
            }
        }

        let targets = match parse_number(matches, "target")? {
            Some(target) => Targets::Single(target),
            None => match (
                parse_number(matches, "low")?,
                parse_number(matches, "average")?,
                parse_number(matches, "high")?,
            ) {
                (Some(low), Some(average), Some(high)) => Targets::Range { low, average, high },
                _ => bail!("either --target or all of --low, --average and --high are required"),
            },
        };

        let request = RoiRequest {
            current_price: required_number(matches, "price")?,
            targets,
            initial_investment: required_number(matches, "investment")?,
            leverage: required_number(matches, "leverage")?,
            event_impact_pct: parse_number(matches, "impact")?,
        };

        let results = service.roi_workflow(&session, request)?;
        if json {
            print_json(&results)?;
        } else {
            print_roi(&results);
        }
    } else if let Some(matches) = matches.subcommand_matches("history") {
        let symbol = matches.value_of("symbol").unwrap_or("AAPL");
        let start = util::parse_date(matches.value_of("start").unwrap_or_default())?;
        let end = util::parse_date(matches.value_of("end").unwrap_or_default())?;

        let summary = service.historical_workflow(symbol, &start, &end).await?;
        if json {
            print_json(&summary)?;
        } else {
            println!("### Historical Analysis Results:");
            println!("Symbol: {}", summary.symbol);
            println!("Start Price: {:.2}", summary.start_price);
            println!("End Price: {:.2}", summary.end_price);
            println!("Total Change%: {:.2}", summary.total_change_pct);
            println!("Average Daily Return%: {:.2}", summary.mean_daily_return_pct);
            println!("Volatility (Std Dev)%: {:.2}", summary.volatility_pct);
            println!("Max Daily Gain%: {:.2}", summary.max_daily_gain_pct);
            println!("Max Daily Loss%: {:.2}", summary.max_daily_loss_pct);
        }
    } else if let Some(matches) = matches.subcommand_matches("event") {
        let symbol = matches.value_of("symbol").unwrap_or_default();
        let tz = util::parse_timezone(matches.value_of("tz").unwrap_or("UTC"))?;
        let event_time = util::parse_event_time(matches.value_of("time").unwrap_or_default(), &tz)?;
        let interval: Interval = matches.value_of("interval").unwrap_or("5m").parse()?;

        match service.event_workflow(&mut session, symbol, event_time, interval).await {
            Some(sample) if json => print_json(&sample)?,
            Some(sample) => {
                println!("### Event Impact ({} bars):", sample.interval);
                println!("Pre-event Price: {:.2}", sample.pre_event_price);
                println!("Change after 1 bar%: {:.2}", sample.change_at_offset_1_pct);
                println!("Change after 2 bars%: {:.2}", sample.change_at_offset_2_pct);
            }
            None => println!("No data found for {} around {}", symbol, event_time),
        }
    } else if let Some(matches) = matches.subcommand_matches("calendar") {
        let from = util::parse_date(matches.value_of("from").unwrap_or_default())?;
        let to = util::parse_date(matches.value_of("to").unwrap_or_default())?;

        let events = service.calendar_workflow(&from, &to).await;
        if json {
            print_json(&events)?;
        } else if events.is_empty() {
            println!("No economic events found between {} and {}", from, to);
        } else {
            println!("{:<20} {:<8} {:<8} {}", "Date", "Country", "Impact", "Event");
            println!("{:-<72}", "");
            for event in &events {
                println!("{:<20} {:<8} {:<8} {}", event.date, event.country, event.impact, event.event);
            }
        }
    } else {
        info!("No command specified. Use --help for usage information.");
    }

    Ok(())
}

fn with_event_args<'a>(cmd: App<'a>) -> App<'a> {
    cmd.arg(
        Arg::with_name("interval")
            .long("interval")
            .value_name("INTERVAL")
            .help("Intraday bar interval for the event window; daily bars are not accepted")
            .takes_value(true)
            .possible_values(&["1m", "2m", "5m", "15m", "30m", "60m", "90m", "1h"])
            .default_value("5m"),
    )
    .arg(
        Arg::with_name("tz")
            .long("tz")
            .value_name("TZ")
            .help("Timezone of the event time, e.g. America/New_York")
            .takes_value(true)
            .default_value("UTC"),
    )
}

fn number_arg<'a>(name: &'a str, help: &'a str) -> Arg<'a> {
    Arg::with_name(name)
        .long(name)
        .value_name("NUMBER")
        .help(help)
        .takes_value(true)
}

fn symbol_arg<'a>() -> Arg<'a> {
    Arg::with_name("symbol")
        .short('s')
        .long("symbol")
        .value_name("SYMBOL")
        .help("Asset symbol, e.g. BTC-USD, AAPL")
        .takes_value(true)
}

fn parse_number(matches: &ArgMatches, name: &str) -> anyhow::Result<Option<f64>> {
    matches
        .value_of(name)
        .map(|raw| raw.trim().parse::<f64>().with_context(|| format!("invalid --{}: {}", name, raw)))
        .transpose()
}

fn required_number(matches: &ArgMatches, name: &str) -> anyhow::Result<f64> {
    parse_number(matches, name)?.ok_or_else(|| anyhow!("--{} is required", name))
}

fn print_roi(results: &[ScenarioResult]) {
    println!("### ROI Calculation Results:");
    for scenario in results {
        println!("{} target {:.2}", scenario.label, scenario.target);
        println!("  ROI%: {:.2}", scenario.result.roi_pct);
        println!("  Profit: {:.2}", scenario.result.profit);
        println!("  Volume: {:.4}", scenario.result.volume);
        println!("  Position Size: {:.2}", scenario.result.position_size);
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
