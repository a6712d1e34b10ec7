use std::{
    fs::{self, OpenOptions},
    sync::{Arc, Mutex},
};

use anyhow::{Context, Result, bail};
use clap::{Arg, ArgAction, ArgMatches, Command};
use simctl_api::SimctlClient;
use simctl_engine::{SubmissionMachine, SubmitMode, WizardState, bulk::BulkForm, load_draft_file, selection};
use simctl_types::{DeviceKind, DeviceLogs, DeviceSummary, Region, SimulatorAction};
use simctl_util::{GeocodingClient, SessionStore, default_config_file, path_from_env, redact_sensitive};
use tracing::info;
use tracing_subscriber::EnvFilter;

const LOG_PATH_ENV: &str = "SIMCTL_LOG_PATH";
const LOG_FILE_NAME: &str = "simctl.log";

#[tokio::main]
async fn main() -> Result<()> {
    let matches = cli().get_matches();
    let session = SessionStore::new().context("failed to open the session store")?;

    // No subcommands => TUI
    if matches.subcommand_name().is_none() {
        init_file_tracing()?;
        let client = SimctlClient::new_from_env()?;
        let geocoder = GeocodingClient::new_from_env()?;
        return simctl_tui::run(client, Arc::new(session), geocoder).await;
    }

    init_tracing();
    run_command(&session, &matches).await
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .try_init();
}

/// The console owns the terminal, so its logs go to a file instead.
fn init_file_tracing() -> Result<()> {
    let path = path_from_env(LOG_PATH_ENV).unwrap_or_else(|| default_config_file(LOG_FILE_NAME));
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("failed to open log file {}", path.display()))?;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init();
    Ok(())
}

fn ids_arg(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name).required(true).num_args(1..).action(ArgAction::Append).help(help)
}

fn simulator_commands(ids: &'static str, help: &'static str) -> [Command; 4] {
    [
        Command::new("start").about("Start the simulator").arg(ids_arg(ids, help)),
        Command::new("stop").about("Stop the simulator").arg(ids_arg(ids, help)),
        Command::new("uplink-start").about("Start sending uplinks").arg(ids_arg(ids, help)),
        Command::new("uplink-stop").about("Stop sending uplinks").arg(ids_arg(ids, help)),
    ]
}

fn cli() -> Command {
    let gateways = Command::new("gateways")
        .about("Manage gateways")
        .subcommand_required(true)
        .subcommand(Command::new("list").about("List gateways"))
        .subcommand(
            Command::new("show")
                .about("Show one gateway")
                .arg(Arg::new("id").required(true).help("Gateway id")),
        )
        .subcommand(Command::new("delete").about("Delete gateways").arg(ids_arg("ids", "Gateway ids")))
        .subcommands(simulator_commands("ids", "Gateway ids"));

    let devices = Command::new("devices")
        .about("Manage devices")
        .subcommand_required(true)
        .subcommand(Command::new("list").about("List devices with their simulator status"))
        .subcommand(
            Command::new("show")
                .about("Show one device record")
                .arg(Arg::new("dev-eui").required(true))
                .arg(
                    Arg::new("show-secrets")
                        .long("show-secrets")
                        .action(ArgAction::SetTrue)
                        .help("Print session and application keys unredacted"),
                ),
        )
        .subcommand(
            Command::new("create")
                .about("Create a device from a YAML or JSON draft")
                .arg(Arg::new("file").long("file").short('f').required(true).help("Path to the draft file")),
        )
        .subcommand(Command::new("delete").about("Delete devices").arg(ids_arg("dev-euis", "Device EUIs")))
        .subcommand(
            Command::new("logs")
                .about("Print the latest simulator log lines of a device")
                .arg(Arg::new("dev-eui").required(true)),
        )
        .subcommand(
            Command::new("bulk")
                .about("Create many devices at once")
                .arg(Arg::new("count").long("count").required(true))
                .arg(Arg::new("name").long("name").required(true).help("Name prefix"))
                .arg(Arg::new("gateway").long("gateway").required(true).help("Gateway name"))
                .arg(Arg::new("region").long("region").help("Defaults to the stored region preference")),
        )
        .subcommands(simulator_commands("dev-euis", "Device EUIs"));

    Command::new("simctl")
        .about("LoRaWAN / SCTE-283 device simulator console. Run without a subcommand for the TUI.")
        .version(env!("CARGO_PKG_VERSION"))
        .subcommand(
            Command::new("login")
                .about("Store the user every request is made for")
                .arg(Arg::new("user").required(true)),
        )
        .subcommand(Command::new("logout").about("Clear the stored user"))
        .subcommand(
            Command::new("defaults")
                .about("Show or change the device wizard defaults")
                .arg(Arg::new("kind").long("kind").help("lorawan or scte283"))
                .arg(Arg::new("region").long("region").help("US915, EU868, AS923 or AU915"))
                .arg(Arg::new("clear").long("clear").action(ArgAction::SetTrue).conflicts_with_all(["kind", "region"])),
        )
        .subcommand(Command::new("dashboard").about("Print device and gateway totals"))
        .subcommand(Command::new("bridge").about("Print the gateway bridge address"))
        .subcommand(gateways)
        .subcommand(devices)
}

fn user_client(session: &SessionStore) -> Result<SimctlClient> {
    let user = session.require_user()?;
    Ok(SimctlClient::new_from_env()?.for_user(user))
}

fn simulator_action(name: &str) -> Option<SimulatorAction> {
    match name {
        "start" => Some(SimulatorAction::Join),
        "stop" => Some(SimulatorAction::Unjoin),
        "uplink-start" => Some(SimulatorAction::StartUplink),
        "uplink-stop" => Some(SimulatorAction::StopUplink),
        _ => None,
    }
}

fn values(matches: &ArgMatches, name: &str) -> Vec<String> {
    matches.get_many::<String>(name).into_iter().flatten().cloned().collect()
}

fn required<'a>(matches: &'a ArgMatches, name: &str) -> Result<&'a str> {
    matches
        .get_one::<String>(name)
        .map(String::as_str)
        .with_context(|| format!("missing argument <{name}>"))
}

async fn run_command(session: &SessionStore, matches: &ArgMatches) -> Result<()> {
    match matches.subcommand() {
        Some(("login", sub)) => {
            let user = required(sub, "user")?;
            session.login(user)?;
            println!("Logged in as {}", user.trim());
        }
        Some(("logout", _)) => {
            session.logout()?;
            println!("Logged out");
        }
        Some(("defaults", sub)) => run_defaults(session, sub)?,
        Some(("dashboard", _)) => {
            let view = user_client(session)?.dashboard().await;
            if let Some(error) = &view.error {
                eprintln!("{error}");
            }
            println!("Devices:      {}", view.summary.total_devices);
            println!("Connected:    {}", view.summary.active_devices);
            println!("Disconnected: {}", view.summary.disconnected_devices());
            println!("Gateways:     {}", view.total_gateways);
            for gateway in &view.per_gateway {
                println!("  {:<24} {:>5} connected {:>5} disconnected", gateway.name, gateway.connected, gateway.disconnected);
            }
        }
        Some(("bridge", _)) => {
            let config = user_client(session)?.gateway_bridge_config().await?;
            println!("{}:{}", config.address, config.port);
        }
        Some(("gateways", sub)) => run_gateways(&user_client(session)?, sub).await?,
        Some(("devices", sub)) => run_devices(session, &user_client(session)?, sub).await?,
        _ => bail!("unknown command; run `simctl --help`"),
    }
    Ok(())
}

fn run_defaults(session: &SessionStore, matches: &ArgMatches) -> Result<()> {
    if matches.get_flag("clear") {
        session.set_default_kind(None)?;
        session.set_default_region(None)?;
    }
    if let Some(kind) = matches.get_one::<String>("kind") {
        session.set_default_kind(Some(kind.parse::<DeviceKind>()?))?;
    }
    if let Some(region) = matches.get_one::<String>("region") {
        session.set_default_region(Some(region.parse::<Region>()?))?;
    }
    let region = session.default_region().map_or("none", |region| region.as_str());
    println!("kind: {}\nregion: {region}", session.default_kind().label());
    Ok(())
}

async fn run_gateways(client: &SimctlClient, matches: &ArgMatches) -> Result<()> {
    match matches.subcommand() {
        Some(("list", _)) => {
            for gateway in client.list_gateways().await? {
                println!(
                    "{:<26} {:<24} {:<8} {:<18} {}",
                    gateway.id().unwrap_or("-"),
                    gateway.name,
                    gateway.kind(),
                    gateway.mac_address,
                    gateway.simulator_status().as_str()
                );
            }
        }
        Some(("show", sub)) => {
            let gateway = client.get_gateway(required(sub, "id")?).await?;
            println!("{}", serde_json::to_string_pretty(&gateway)?);
        }
        Some(("delete", sub)) => {
            let ids = values(sub, "ids");
            for id in &ids {
                client.delete_gateway(id).await.context(selection::GATEWAY_DELETE_FAILED_MESSAGE)?;
            }
            info!(count = ids.len(), "gateways deleted");
            println!("{}", selection::GATEWAYS_DELETED_MESSAGE);
        }
        Some((name, sub)) => {
            let action = simulator_action(name).with_context(|| format!("unknown gateways command `{name}`"))?;
            for id in values(sub, "ids") {
                client
                    .gateway_simulator(action, &id)
                    .await
                    .with_context(|| selection::gateway_action_failure(action, &id))?;
                println!("{id}: {}", action.label());
            }
        }
        None => bail!("expected a gateways command"),
    }
    Ok(())
}

async fn run_devices(session: &SessionStore, client: &SimctlClient, matches: &ArgMatches) -> Result<()> {
    match matches.subcommand() {
        Some(("list", _)) => {
            let devices = client.list_devices().await.context(selection::DEVICES_FETCH_FAILED_MESSAGE)?;
            for device in devices {
                println!(
                    "{:<18} {:<24} {:<20} {:<8} {}",
                    device.dev_eui,
                    device.name,
                    device.gateway,
                    device.simulator_status().as_str(),
                    device.uplink_status().as_str()
                );
            }
        }
        Some(("show", sub)) => {
            let record = client.get_device(required(sub, "dev-eui")?).await?;
            let rendered = serde_json::to_string_pretty(&record)?;
            if sub.get_flag("show-secrets") {
                println!("{rendered}");
            } else {
                println!("{}", redact_sensitive(&rendered));
            }
        }
        Some(("create", sub)) => {
            let draft = load_draft_file(required(sub, "file")?)?;
            let mut machine = SubmissionMachine::new(SubmitMode::Create);
            let mut wizard = WizardState::new(draft.kind);
            simctl_engine::submit(&mut machine, &draft, &mut wizard, client).await?;
            println!("{}", SubmitMode::Create.success_message());
        }
        Some(("delete", sub)) => {
            let dev_euis = values(sub, "dev-euis");
            for dev_eui in &dev_euis {
                client.delete_device(dev_eui).await.context(selection::DEVICE_DELETE_FAILED_MESSAGE)?;
            }
            info!(count = dev_euis.len(), "devices deleted");
            println!("Deleted {} device(s).", dev_euis.len());
        }
        Some(("logs", sub)) => {
            let logs: DeviceLogs = client.device_logs(required(sub, "dev-eui")?).await?;
            for line in logs.tail() {
                println!("{line}");
            }
        }
        Some(("bulk", sub)) => {
            let region = match sub.get_one::<String>("region") {
                Some(region) => Some(region.parse::<Region>()?),
                None => session.default_region(),
            };
            let form = BulkForm {
                count: required(sub, "count")?.to_string(),
                name: required(sub, "name")?.to_string(),
                gateway: sub.get_one::<String>("gateway").cloned(),
                region,
            };
            let request = form.to_request()?;
            let response = client
                .create_bulk_devices(&request)
                .await
                .map_err(|error| anyhow::anyhow!(simctl_engine::bulk::failure_message(&error)))?;
            println!("{}", response.summary());
        }
        Some((name, sub)) => {
            let action = simulator_action(name).with_context(|| format!("unknown devices command `{name}`"))?;
            let wanted = values(sub, "dev-euis");
            let devices = client.list_devices().await.context(selection::DEVICES_FETCH_FAILED_MESSAGE)?;
            let selected = select_devices(&devices, &wanted)?;
            let dev_euis = selection::check_device_action(action, &selected)?;
            client
                .device_simulator(action, &dev_euis)
                .await
                .context(selection::device_action_failure(action))?;
            println!("{}: {}", action.label(), dev_euis.join(", "));
        }
        None => bail!("expected a devices command"),
    }
    Ok(())
}

fn select_devices<'a>(devices: &'a [DeviceSummary], wanted: &[String]) -> Result<Vec<&'a DeviceSummary>> {
    wanted
        .iter()
        .map(|dev_eui| {
            devices
                .iter()
                .find(|device| device.dev_eui.eq_ignore_ascii_case(dev_eui))
                .with_context(|| format!("unknown device {dev_eui}"))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use simctl_util::session::SESSION_USER_ENV;

    fn run_blocking(session: &SessionStore, args: &[&str]) -> Result<()> {
        let matches = cli().try_get_matches_from(args)?;
        let runtime = tokio::runtime::Runtime::new()?;
        runtime.block_on(run_command(session, &matches))
    }

    #[test]
    fn command_tree_is_consistent() {
        cli().debug_assert();
    }

    #[test]
    fn bare_invocation_selects_the_console() {
        let matches = cli().try_get_matches_from(["simctl"]).unwrap();
        assert!(matches.subcommand_name().is_none());
    }

    #[test]
    fn simulator_commands_collect_every_id() {
        let matches = cli()
            .try_get_matches_from(["simctl", "devices", "uplink-start", "0102", "0304"])
            .unwrap();
        let (_, devices) = matches.subcommand().unwrap();
        let (name, sub) = devices.subcommand().unwrap();
        assert_eq!(simulator_action(name), Some(SimulatorAction::StartUplink));
        assert_eq!(values(sub, "dev-euis"), vec!["0102", "0304"]);
    }

    #[test]
    fn clear_conflicts_with_new_defaults() {
        assert!(cli().try_get_matches_from(["simctl", "defaults", "--clear", "--kind", "lorawan"]).is_err());
    }

    #[test]
    fn remote_commands_require_a_session() {
        temp_env::with_var_unset(SESSION_USER_ENV, || {
            let session = SessionStore::ephemeral();
            let error = run_blocking(&session, &["simctl", "devices", "list"]).unwrap_err();
            assert!(error.to_string().contains("not logged in"));
        });
    }

    #[test]
    fn login_and_logout_persist_the_user() {
        temp_env::with_var_unset(SESSION_USER_ENV, || {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("session.json");
            let session = SessionStore::at_path(&path).unwrap();

            run_blocking(&session, &["simctl", "login", " ops "]).unwrap();
            assert_eq!(SessionStore::at_path(&path).unwrap().user().as_deref(), Some("ops"));

            run_blocking(&session, &["simctl", "logout"]).unwrap();
            assert!(!SessionStore::at_path(&path).unwrap().is_authenticated());
        });
    }

    #[test]
    fn defaults_parse_kind_and_region() {
        let session = SessionStore::ephemeral();
        run_blocking(&session, &["simctl", "defaults", "--kind", "scte283", "--region", "eu868"]).unwrap();
        assert_eq!(session.default_kind(), DeviceKind::Scte283);
        assert_eq!(session.default_region(), Some(Region::Eu868));

        run_blocking(&session, &["simctl", "defaults", "--clear"]).unwrap();
        assert_eq!(session.default_region(), None);
    }

    #[test]
    fn unknown_devices_are_reported() {
        let devices = vec![DeviceSummary {
            dev_eui: "0102".into(),
            ..DeviceSummary::default()
        }];
        let error = select_devices(&devices, &["0102".into(), "ffff".into()]).unwrap_err();
        assert_eq!(error.to_string(), "unknown device ffff");
    }
}
