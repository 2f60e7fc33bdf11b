//! Command-line front end: parses arguments, wires config, session and
//! gateways together, and prints results.

pub mod outputformatter;

use std::io::{self, BufRead};
use std::path::PathBuf;

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::config::{ClientConfig, ConfigOverrides};
use crate::error::{AppError, AppResult};
use crate::gateway::models::{Page, UserQuery};
use crate::gateway::{AdminGateway, ApiClient, AuthGateway, ManagerGateway};
use crate::identity::{Gender, LoginRequest, RegisterRequest, Screen, SessionContext, SessionStore};

pub fn usage(program: &str) -> String {
    format!(
        "Usage:\n  {program} [flags] <command> [args]\n\nCommands:\n  login <email> <password|->         sign in ('-' reads the password from stdin)\n  register <email> <password|-> <name> [--gender male|female|other] [--role <name>]\n  logout                             forget the stored session\n  whoami                             show the signed-in user, roles and landing dashboard\n  route <Screen>                     show which screen the session would land on\n  admin stats|users|user <id>|set-role <id> <role>|toggle <id>|roles|logs|settings\n  manager dashboard|team|profile|reports|tasks|inventory|schedule\n\nFlags:\n  --api-url <url>          Backend base URL (env: ROLEGATE_API_URL, default http://localhost:5289/api)\n  --timeout-ms <n>         Request timeout (env: ROLEGATE_TIMEOUT_MS, default 15000)\n  --session-dir <path>     Session directory (env: ROLEGATE_SESSION_DIR, default ~/.rolegate)\n  --page <n> --page-size <n> --search <text> --role <name>   listing filters\n  --json                   print raw JSON instead of tables\n  -h, --help               show this help\n"
    )
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminCommand {
    Stats,
    Users(UserQuery),
    User { id: String },
    SetRole { id: String, role: String },
    Toggle { id: String },
    Roles,
    Logs { page: u32, page_size: u32 },
    Settings,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManagerCommand {
    Dashboard,
    Team(UserQuery),
    Profile,
    Reports,
    Tasks,
    Inventory,
    Schedule,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Login { email: String, password: String },
    Register { email: String, password: String, name: String, gender: Gender, role: String },
    Logout,
    WhoAmI,
    Route { screen: Screen },
    Admin(AdminCommand),
    Manager(ManagerCommand),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliArgs {
    pub overrides: ConfigOverrides,
    pub json: bool,
    pub command: Command,
}

#[derive(Debug, Default)]
struct Flags {
    page: Option<u32>,
    page_size: Option<u32>,
    search: Option<String>,
    role: Option<String>,
    gender: Option<String>,
}

fn parse_num<T: std::str::FromStr>(flag: &str, v: &str) -> AppResult<T> {
    v.trim().parse::<T>().map_err(|_| AppError::user("invalid_flag", format!("{} expects a number, got '{}'", flag, v)))
}

fn need(pos: &[String], i: usize, what: &str) -> AppResult<String> {
    pos.get(i).cloned().ok_or_else(|| AppError::user("missing_argument", format!("missing {}", what)))
}

// "-" means read one line from stdin so passwords stay out of shell history.
fn resolve_password(p: String) -> AppResult<String> {
    if p != "-" { return Ok(p); }
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line).map_err(|e| AppError::user("stdin", e.to_string()))?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

pub fn parse_args(args: &[String]) -> AppResult<CliArgs> {
    let mut overrides = ConfigOverrides::default();
    let mut flags = Flags::default();
    let mut json = false;
    let mut help = false;
    let mut pos: Vec<String> = Vec::new();

    let mut i = 0;
    while i < args.len() {
        let a = args[i].as_str();
        let takes_value = matches!(a, "--api-url" | "--timeout-ms" | "--session-dir" | "--page" | "--page-size" | "--search" | "--role" | "--gender");
        if takes_value {
            let v = args.get(i + 1).cloned().ok_or_else(|| AppError::user("missing_flag_value", format!("{} requires a value", a)))?;
            match a {
                "--api-url" => overrides.api_url = Some(v),
                "--timeout-ms" => overrides.timeout_ms = Some(parse_num(a, &v)?),
                "--session-dir" => overrides.session_dir = Some(PathBuf::from(v)),
                "--page" => flags.page = Some(parse_num(a, &v)?),
                "--page-size" => flags.page_size = Some(parse_num(a, &v)?),
                "--search" => flags.search = Some(v),
                "--role" => flags.role = Some(v),
                _ => flags.gender = Some(v),
            }
            i += 2;
            continue;
        }
        match a {
            "--json" => json = true,
            "-h" | "--help" => help = true,
            s if s.starts_with("--") => return Err(AppError::user("unknown_flag", format!("unknown flag '{}'", s))),
            _ => pos.push(args[i].clone()),
        }
        i += 1;
    }

    let query = |default_size: u32| UserQuery {
        page: flags.page.unwrap_or(1).max(1),
        page_size: flags.page_size.unwrap_or(default_size).max(1),
        search_term: flags.search.clone(),
        role_filter: flags.role.clone(),
    };

    let command = if help || pos.is_empty() {
        Command::Help
    } else {
        match pos[0].as_str() {
            "login" => Command::Login { email: need(&pos, 1, "email")?, password: need(&pos, 2, "password")? },
            "register" => Command::Register {
                email: need(&pos, 1, "email")?,
                password: need(&pos, 2, "password")?,
                name: need(&pos, 3, "name")?,
                gender: flags.gender.as_deref().unwrap_or("other").parse()?,
                role: flags.role.clone().unwrap_or_else(|| "User".to_string()),
            },
            "logout" => Command::Logout,
            "whoami" => Command::WhoAmI,
            "route" => Command::Route { screen: need(&pos, 1, "screen name")?.parse()? },
            "admin" => Command::Admin(match need(&pos, 1, "admin subcommand")?.as_str() {
                "stats" => AdminCommand::Stats,
                "users" => AdminCommand::Users(query(20)),
                "user" => AdminCommand::User { id: need(&pos, 2, "user id")? },
                "set-role" => AdminCommand::SetRole { id: need(&pos, 2, "user id")?, role: need(&pos, 3, "role name")? },
                "toggle" => AdminCommand::Toggle { id: need(&pos, 2, "user id")? },
                "roles" => AdminCommand::Roles,
                "logs" => {
                    let q = query(50);
                    AdminCommand::Logs { page: q.page, page_size: q.page_size }
                }
                "settings" => AdminCommand::Settings,
                other => return Err(AppError::user("unknown_command", format!("unknown admin subcommand '{}'", other))),
            }),
            "manager" => Command::Manager(match need(&pos, 1, "manager subcommand")?.as_str() {
                "dashboard" => ManagerCommand::Dashboard,
                "team" => ManagerCommand::Team(query(20)),
                "profile" => ManagerCommand::Profile,
                "reports" => ManagerCommand::Reports,
                "tasks" => ManagerCommand::Tasks,
                "inventory" => ManagerCommand::Inventory,
                "schedule" => ManagerCommand::Schedule,
                other => return Err(AppError::user("unknown_command", format!("unknown manager subcommand '{}'", other))),
            }),
            other => return Err(AppError::user("unknown_command", format!("unknown command '{}'", other))),
        }
    };

    Ok(CliArgs { overrides, json, command })
}

/// Screen a command stands in for; the session must be allowed to land there.
fn screen_for(cmd: &Command) -> Option<Screen> {
    match cmd {
        Command::Admin(a) => Some(match a {
            AdminCommand::Stats => Screen::AdminDashboard,
            AdminCommand::Logs { .. } => Screen::ActivityLogs,
            AdminCommand::Settings => Screen::SystemSettings,
            _ => Screen::UserManagement,
        }),
        Command::Manager(m) => Some(match m {
            ManagerCommand::Dashboard => Screen::ManagerDashboard,
            ManagerCommand::Team(_) => Screen::ManagerTeamManagement,
            ManagerCommand::Profile => Screen::ManagerMyProfile,
            ManagerCommand::Reports => Screen::ManagerReports,
            ManagerCommand::Tasks => Screen::ManagerTasks,
            ManagerCommand::Inventory => Screen::ManagerInventory,
            ManagerCommand::Schedule => Screen::ManagerSchedule,
        }),
        _ => None,
    }
}

// Mirrors the app's redirect-on-mount: a screen the session would be bounced
// from is not fetched. The backend still authorizes every call.
fn enter(ctx: &SessionContext, screen: Screen) -> AppResult<()> {
    let shown = ctx.route(screen);
    if shown == Screen::Login {
        return Err(AppError::auth("not_signed_in", "sign in first (rolegate login <email> <password>)"));
    }
    if shown != screen {
        return Err(AppError::forbidden("redirected", format!("{} is not available to this session; it lands on {}", screen, shown)));
    }
    Ok(())
}

fn emit<T: Serialize>(json: bool, value: &T) -> AppResult<()> {
    let v = serde_json::to_value(value)?;
    if json || !outputformatter::print_table(&v) {
        println!("{}", serde_json::to_string_pretty(&v)?);
    }
    Ok(())
}

fn emit_page<T: Serialize>(json: bool, page: &Page<T>) -> AppResult<()> {
    if json {
        return emit(true, page);
    }
    let data = serde_json::to_value(&page.data)?;
    if !outputformatter::print_table(&data) {
        println!("(no entries)");
    }
    let p = &page.pagination;
    println!("page {}/{} (total {})", p.current_page, p.total_pages.max(1), p.total_count);
    Ok(())
}

pub async fn run(args: CliArgs) -> AppResult<()> {
    if args.command == Command::Help {
        println!("{}", usage("rolegate"));
        return Ok(());
    }

    let config = ClientConfig::from_env().with_overrides(&args.overrides);
    debug!(target: "rolegate::cli", "api_url={} session_dir={}", config.api_url, config.session_dir.display());
    let store = SessionStore::on_disk(&config.session_dir);
    let ctx = SessionContext::new(store.clone());
    ctx.init();
    let api = ApiClient::new(config, store)?;

    if let Some(screen) = screen_for(&args.command) {
        enter(&ctx, screen)?;
    }

    let json = args.json;
    match args.command {
        Command::Help => {}
        Command::Login { email, password } => {
            let auth = AuthGateway::new(api, ctx.clone());
            let password = resolve_password(password)?;
            let s = auth.login(&LoginRequest { email, password }).await?;
            println!("signed in as {} -> {}", s.display_name(), ctx.dashboard());
        }
        Command::Register { email, password, name, gender, role } => {
            let auth = AuthGateway::new(api, ctx.clone());
            let password = resolve_password(password)?;
            let req = RegisterRequest { email, password, person_name: name, gender, role_name: role };
            let s = auth.register(&req).await?;
            println!("registered and signed in as {} -> {}", s.display_name(), ctx.dashboard());
        }
        Command::Logout => {
            AuthGateway::new(api, ctx.clone()).logout();
            println!("signed out");
        }
        Command::WhoAmI => match ctx.principal() {
            Some(p) if json => emit(true, &p)?,
            Some(p) => {
                println!("user:      {} <{}>", p.display_name, p.email);
                println!("user id:   {}", p.user_id);
                println!("roles:     {}", if p.roles.is_empty() { "(none)".to_string() } else { p.roles.join(", ") });
                println!("dashboard: {}", p.dashboard);
                if let Some(exp) = p.expires_at {
                    println!("expires:   {}", exp.to_rfc3339());
                }
            }
            None => println!("not signed in"),
        },
        Command::Route { screen } => {
            let shown = ctx.route(screen);
            if json {
                emit(true, &serde_json::json!({ "requested": screen, "shown": shown }))?;
            } else if shown == screen {
                println!("{}", shown);
            } else {
                println!("{} -> {}", screen, shown);
            }
        }
        Command::Admin(cmd) => {
            let admin = AdminGateway::new(api);
            match cmd {
                AdminCommand::Stats => emit(json, &admin.dashboard_stats().await?)?,
                AdminCommand::Users(q) => emit_page(json, &admin.users(&q).await?)?,
                AdminCommand::User { id } => emit(json, &admin.user_by_id(&id).await?)?,
                AdminCommand::SetRole { id, role } => println!("{}", admin.update_user_role(&id, &role).await?.message),
                AdminCommand::Toggle { id } => println!("{}", admin.toggle_user_status(&id).await?.message),
                AdminCommand::Roles => emit(json, &admin.roles().await?)?,
                AdminCommand::Logs { page, page_size } => emit_page(json, &admin.activity_logs(page, page_size).await?)?,
                AdminCommand::Settings => emit(json, &admin.system_settings().await?)?,
            }
        }
        Command::Manager(cmd) => {
            let manager = ManagerGateway::new(api);
            let out: Value = match cmd {
                ManagerCommand::Dashboard => manager.dashboard().await?,
                ManagerCommand::Team(q) => return emit_page(json, &manager.team(&q).await?),
                ManagerCommand::Profile => serde_json::to_value(manager.profile().await?)?,
                ManagerCommand::Reports => Value::Array(manager.reports().await?),
                ManagerCommand::Tasks => Value::Array(manager.tasks().await?),
                ManagerCommand::Inventory => Value::Array(manager.inventory().await?),
                ManagerCommand::Schedule => Value::Array(manager.schedule().await?),
            };
            emit(json, &out)?;
        }
    }
    Ok(())
}
