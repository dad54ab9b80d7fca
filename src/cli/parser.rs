use clap::{Parser, Subcommand};

/// Command-line interface definition for shopclock
/// Kiosk and admin front-end for the replicated time-clock core
#[derive(Parser)]
#[command(
    name = "shopclock",
    version = env!("CARGO_PKG_VERSION"),
    about = "Shop time-clock: dual-target SQLite persistence with per-employee clock state",
    long_about = None
)]
pub struct Cli {
    /// Override the primary database location (useful for tests or custom DB)
    #[arg(global = true, long = "db")]
    pub db: Option<String>,

    /// Override the secondary database location
    #[arg(global = true, long = "db2", hide = true)]
    pub db2: Option<String>,

    /// Run in test mode (no config file update)
    #[arg(global = true, long = "test", hide = true)]
    pub test: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the configuration and the active databases
    Init,

    /// Manage storage targets (connectivity probe, schema upgrade)
    Db {
        /// Probe connectivity and schema of a target
        #[arg(long = "probe")]
        probe: bool,

        /// Create or upgrade the schema on the selected target(s)
        #[arg(long = "init-schema")]
        init_schema: bool,

        /// Target of the operation: primary|secondary for --probe,
        /// active|primary|secondary|both for --init-schema
        #[arg(long = "target")]
        target: Option<String>,

        /// Print machine-readable output
        #[arg(long = "json")]
        json: bool,
    },

    /// Clock employees in and out
    Clock {
        #[command(subcommand)]
        action: ClockAction,
    },

    /// Manage employees
    Employee {
        #[command(subcommand)]
        action: EmployeeAction,
    },

    /// Manage time entries (admin path, gated by schema version)
    Entry {
        #[command(subcommand)]
        action: EntryAction,
    },

    /// Show or change store settings, including storage targets
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },

    /// Manage admin accounts
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },

    /// Print the audit log
    Log {
        /// Maximum number of lines to print
        #[arg(long = "limit", default_value_t = 50)]
        limit: i64,
    },
}

#[derive(Subcommand)]
pub enum ClockAction {
    /// Clock an employee in
    In {
        /// Employee badge code
        code: String,

        /// Device fingerprint of the kiosk
        #[arg(long = "device")]
        device: Option<String>,

        #[arg(long = "json")]
        json: bool,
    },

    /// Clock an employee out
    Out {
        code: String,

        #[arg(long = "device")]
        device: Option<String>,

        #[arg(long = "json")]
        json: bool,
    },

    /// Show whether an employee is on shift
    Status {
        code: String,

        #[arg(long = "json")]
        json: bool,
    },

    /// List all open shifts
    Active {
        #[arg(long = "json")]
        json: bool,
    },
}

#[derive(Subcommand)]
pub enum EmployeeAction {
    /// Add an employee
    Add {
        /// Full name
        name: String,

        /// Unique badge code
        code: String,

        /// External payroll id (numeric string, leading zeros preserved)
        #[arg(long = "external-id")]
        external_id: Option<String>,

        /// Hourly rate
        #[arg(long = "rate", default_value_t = 0.0)]
        rate: f64,

        /// Create the employee as inactive
        #[arg(long = "inactive")]
        inactive: bool,

        /// Acting admin (validated upstream)
        #[arg(long = "admin", default_value = "admin")]
        admin: String,
    },

    /// List employees
    List {
        #[arg(long = "json")]
        json: bool,
    },

    /// Update an employee
    Set {
        /// Employee id
        id: i64,

        #[arg(long = "name")]
        name: Option<String>,

        #[arg(long = "code")]
        code: Option<String>,

        #[arg(long = "external-id")]
        external_id: Option<String>,

        #[arg(long = "rate")]
        rate: Option<f64>,

        /// Set the active flag (true|false)
        #[arg(long = "active")]
        active: Option<bool>,

        #[arg(long = "admin", default_value = "admin")]
        admin: String,
    },

    /// Delete an employee and their time entries
    Del {
        id: i64,

        #[arg(long = "admin", default_value = "admin")]
        admin: String,
    },
}

#[derive(Subcommand)]
pub enum EntryAction {
    /// Add a fully closed entry
    Add {
        /// Employee badge code
        code: String,

        /// Clock-in timestamp (YYYY-MM-DD HH:MM)
        #[arg(long = "in")]
        clock_in: String,

        /// Clock-out timestamp (YYYY-MM-DD HH:MM)
        #[arg(long = "out")]
        clock_out: String,

        #[arg(long = "admin", default_value = "admin")]
        admin: String,
    },

    /// Edit the timestamps of an existing entry
    Edit {
        /// Entry id
        id: i64,

        #[arg(long = "in")]
        clock_in: Option<String>,

        #[arg(long = "out")]
        clock_out: Option<String>,

        #[arg(long = "admin", default_value = "admin")]
        admin: String,
    },

    /// Delete an entry
    Del {
        id: i64,

        #[arg(long = "admin", default_value = "admin")]
        admin: String,
    },
}

#[derive(Subcommand)]
pub enum SettingsAction {
    /// Print the current settings
    Show {
        #[arg(long = "json")]
        json: bool,
    },

    /// Update settings; target changes re-trigger a schema probe
    Set {
        #[arg(long = "currency")]
        currency: Option<String>,

        #[arg(long = "brand")]
        brand_name: Option<String>,

        #[arg(long = "theme")]
        theme_color: Option<String>,

        /// Pre-hashed admin PIN (hashing happens upstream)
        #[arg(long = "pin-hash")]
        pin_hash: Option<String>,

        #[arg(long = "show-device-ids")]
        show_device_ids: Option<bool>,

        #[arg(long = "primary-host")]
        primary_host: Option<String>,

        #[arg(long = "primary-port")]
        primary_port: Option<u16>,

        #[arg(long = "primary-user")]
        primary_user: Option<String>,

        #[arg(long = "primary-secret")]
        primary_secret: Option<String>,

        #[arg(long = "primary-active")]
        primary_active: Option<bool>,

        #[arg(long = "secondary-host")]
        secondary_host: Option<String>,

        #[arg(long = "secondary-port")]
        secondary_port: Option<u16>,

        #[arg(long = "secondary-user")]
        secondary_user: Option<String>,

        #[arg(long = "secondary-secret")]
        secondary_secret: Option<String>,

        #[arg(long = "secondary-active")]
        secondary_active: Option<bool>,

        /// Designated read-of-record target (primary|secondary)
        #[arg(long = "primary-target")]
        primary_target: Option<String>,

        #[arg(long = "admin", default_value = "admin")]
        admin: String,
    },
}

#[derive(Subcommand)]
pub enum AdminAction {
    /// Create or update an admin account
    Add {
        name: String,

        /// Pre-hashed PIN (hashing happens upstream)
        #[arg(long = "pin-hash")]
        pin_hash: String,
    },

    /// List admin accounts
    List {
        #[arg(long = "json")]
        json: bool,
    },
}
