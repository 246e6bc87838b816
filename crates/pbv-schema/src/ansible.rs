//! # Built-in Ansible Schemas
//!
//! Definitions for the playbooks and inventory of the VM provisioning
//! tooling, and the table that maps their file names to schemas.
//!
//! | file                          | definition  |
//! |-------------------------------|-------------|
//! | `install_vm_dependencies.yml` | `play_list` |
//! | `calculate_max_vms.yml`       | `play_list` |
//! | `ssh_key_setup.yml`           | `play_list` |
//! | `show_vms_data.yml`           | `play_list` |
//! | `create_vms.yml`              | `play_list` |
//! | `inventory.yml`               | `inventory` |
//!
//! Unknown files fall back to `play_list` when the fallback is enabled.
//! `secret.yml` is never validated.

use std::collections::BTreeMap;

use crate::definition::{Def, SchemaDefinition};
use crate::registry::SchemaRegistry;
use crate::table::{SchemaTable, SchemaTableError};

pub const TASK: &str = "task";
pub const PLAY: &str = "play";
pub const PLAY_LIST: &str = "play_list";
pub const INVENTORY: &str = "inventory";

/// Vault file holding credentials; never loaded.
pub const SECRETS_FILE: &str = "secret.yml";

pub const INVENTORY_FILE: &str = "inventory.yml";

pub const PLAY_LIST_FILES: [&str; 5] = [
    "install_vm_dependencies.yml",
    "calculate_max_vms.yml",
    "ssh_key_setup.yml",
    "show_vms_data.yml",
    "create_vms.yml",
];

fn any_map() -> Def {
    Def::map(Def::Any)
}

fn task() -> Def {
    let debug = Def::record()
        .optional("msg", Def::Str)
        .optional("var", Def::Str);
    let copy = Def::record()
        .optional("content", Def::Str)
        .optional("dest", Def::Str)
        .optional("mode", Def::Str)
        .optional("src", Def::Str);
    let expect = Def::record()
        .optional("command", Def::Str)
        .optional("responses", Def::map(Def::Str))
        .optional("timeout", Def::Str);
    let file = Def::record()
        .optional("path", Def::Str)
        .optional("state", Def::Str)
        .optional("mode", Def::Str);
    let shell = Def::union([("free_form", Def::Str), ("params", any_map())]);
    let nested = || Def::array(Def::reference(TASK));

    Def::record()
        .optional("name", Def::Str)
        .optional("become", Def::Bool)
        .optional("become_user", Def::Str)
        .optional("become_method", Def::Str)
        .optional("when", Def::Any)
        .optional("register", Def::Str)
        .optional("debug", debug)
        .optional("shell", Def::Str)
        .optional("command", Def::Str)
        .optional("copy", copy)
        .optional("set_fact", any_map())
        .optional("expect", expect)
        .optional("fetch", any_map())
        .optional("fail", any_map())
        .optional("ansible.builtin.file", file)
        .optional("ansible.builtin.openssh_keypair", any_map())
        .optional("ansible.builtin.apt", any_map())
        .optional("ansible.builtin.shell", shell)
        .optional("loop", Def::Any)
        .optional("delegate_to", Def::Str)
        .optional("no_log", Def::Bool)
        .optional("changed_when", Def::Bool)
        .optional("ignore_errors", Def::Bool)
        .optional("async", Def::Int)
        .optional("poll", Def::Int)
        .optional("block", nested())
        .optional("rescue", nested())
        .optional("always", nested())
        .into()
}

fn play() -> Def {
    Def::record()
        .required("name", Def::Str)
        .required("hosts", Def::Str)
        .optional("become", Def::Bool)
        .optional("become_user", Def::Str)
        .optional("become_method", Def::Str)
        .optional("gather_facts", Def::Bool)
        .optional("vars_files", Def::array(Def::Str))
        .optional("vars", any_map())
        .optional("tasks", Def::array(Def::reference(TASK)))
        .into()
}

fn inventory() -> Def {
    let vars = Def::record()
        .required("ansible_vm_deploy_scripts", Def::Str)
        .required("ansible_secret_file_path", Def::Str)
        .required("ansible_timeout_for_create_vm_script", Def::Int)
        .required("ansible_timeout_for_install_vm_dependencies", Def::Int);
    let all = Def::record()
        .required("vars", vars)
        .required("hosts", Def::map(Def::reference("host")));
    Def::record().required("all", all).into()
}

fn host() -> Def {
    Def::record()
        .optional("ansible_host", Def::Scalar)
        .optional("ansible_user", Def::Scalar)
        .optional("ansible_password", Def::Str)
        .optional("ansible_become", Def::Bool)
        .optional("ansible_become_pass", Def::Str)
        .optional("ansible_become_method", Def::Str)
        .optional("ansible_become_user", Def::Str)
        .optional("copy_path", Def::Str)
        .optional("number_of_vms", Def::Int)
        .optional("install_packages", Def::Int)
        .open()
        .into()
}

/// The built-in named definitions.
pub fn definitions() -> SchemaDefinition {
    SchemaDefinition::new()
        .define(TASK, task())
        .define(PLAY, play())
        .define(PLAY_LIST, Def::array(Def::reference(PLAY)))
        .define("host", host())
        .define(INVENTORY, inventory())
}

/// The built-in table: definitions, file map, fallback and exclusions.
pub fn table() -> SchemaTable {
    let mut files: BTreeMap<String, String> = PLAY_LIST_FILES
        .iter()
        .map(|f| ((*f).to_owned(), PLAY_LIST.to_owned()))
        .collect();
    files.insert(INVENTORY_FILE.to_owned(), INVENTORY.to_owned());

    SchemaTable {
        definitions: definitions(),
        files,
        fallback: Some(PLAY_LIST.to_owned()),
        exclude: vec![SECRETS_FILE.to_owned()],
    }
}

/// Registry over the built-in table.
pub fn registry(use_fallback: bool) -> Result<SchemaRegistry, SchemaTableError> {
    table().into_registry(use_fallback)
}
