//! Interactive trap shell
//!
//! One proxy over a backing-store handler, driven line by line. Every trap
//! the proxy runs is recorded and can be listed with `log`.

use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use crate::error::{CliError, CliResult};
use crate::fixtures::{backing_store_handler, object_with};
use proxy_runtime::{reflect, JsObject, JsValue, ProxyFactory, TrapRecorder};

const HELP: &str = "\
Commands:
  has NAME                 NAME in proxy
  hasown NAME              own property check
  get NAME                 proxy[NAME]
  set NAME VALUE           proxy[NAME] = VALUE
  delete NAME              delete proxy[NAME]
  keys                     Object.keys(proxy)
  names                    Object.getOwnPropertyNames(proxy)
  enumerate                for..in names
  define NAME VALUE [FLAGS] define a data property; FLAGS are any of
                           writable enumerable configurable
  freeze | seal            lock the proxy
  state                    trapping/extensible/sealed/frozen
  log [clear]              traps run so far
  help                     this text
  exit                     leave the shell";

/// What the caller should do after a command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellOutcome {
    /// Print this (may be empty)
    Output(String),
    /// Leave the shell
    Exit,
}

/// Shell state
pub struct Shell {
    store: JsObject,
    proxy: JsValue,
    recorder: TrapRecorder,
}

impl Shell {
    /// Shell over a fresh, empty backing store
    pub fn new() -> CliResult<Self> {
        let store = JsObject::new();
        let proxy = ProxyFactory::create(&backing_store_handler(&store), None)?;
        let recorder = TrapRecorder::new();
        proxy.observe(recorder.clone());
        Ok(Shell {
            store,
            proxy: proxy.to_value(),
            recorder,
        })
    }

    /// The proxy under test
    pub fn proxy(&self) -> &JsValue {
        &self.proxy
    }

    /// The handler's backing store
    pub fn store(&self) -> &JsObject {
        &self.store
    }

    /// Trap log
    pub fn recorder(&self) -> &TrapRecorder {
        &self.recorder
    }

    /// Run one command line
    pub fn execute(&mut self, line: &str) -> CliResult<ShellOutcome> {
        let mut words = line.split_whitespace();
        let Some(command) = words.next() else {
            return Ok(ShellOutcome::Output(String::new()));
        };
        let args: Vec<&str> = words.collect();
        tracing::debug!(command, ?args, "shell command");

        let p = &self.proxy;
        let output = match (command, args.as_slice()) {
            ("exit" | "quit" | ".exit", _) => return Ok(ShellOutcome::Exit),
            ("help" | ".help", _) => HELP.to_string(),
            ("has", [name]) => reflect::has(p, name)?.to_string(),
            ("hasown", [name]) => reflect::has_own_property(p, name)?.to_string(),
            ("get", [name]) => format_value(&reflect::get(p, name)?),
            ("set", [name, value @ ..]) if !value.is_empty() => {
                reflect::set(p, name, parse_value(&value.join(" ")))?.to_string()
            }
            ("delete", [name]) => reflect::delete_property(p, name)?.to_string(),
            ("keys", []) => format_names(&reflect::keys(p)?),
            ("names", []) => format_names(&reflect::get_own_property_names(p)?),
            ("enumerate", []) => format_names(&reflect::for_in(p)?),
            ("define", [name, value, flags @ ..]) => {
                let desc = descriptor(value, flags)?;
                ProxyFactory::define_property(p, name, &desc)?.to_string()
            }
            ("freeze", []) => ProxyFactory::freeze(p)?.to_string(),
            ("seal", []) => ProxyFactory::seal(p)?.to_string(),
            ("state", []) => format!(
                "trapping: {}, extensible: {}, sealed: {}, frozen: {}",
                ProxyFactory::is_trapping(p)?,
                ProxyFactory::is_extensible(p)?,
                ProxyFactory::is_sealed(p)?,
                ProxyFactory::is_frozen(p)?
            ),
            ("log", []) => self.format_log(),
            ("log", ["clear"]) => {
                self.recorder.clear();
                String::new()
            }
            (
                "has" | "hasown" | "get" | "set" | "delete" | "keys" | "names" | "enumerate"
                | "define" | "freeze" | "seal" | "state" | "log",
                _,
            ) => {
                return Err(CliError::Shell(format!(
                    "wrong arguments for '{}', type help for usage",
                    command
                )))
            }
            _ => return Err(CliError::Shell(format!("Unknown command: {}", command))),
        };
        Ok(ShellOutcome::Output(output))
    }

    fn format_log(&self) -> String {
        self.recorder
            .events()
            .iter()
            .enumerate()
            .map(|(i, event)| match &event.name {
                Some(name) => format!("{}. {}({})", i + 1, event.trap, name),
                None => format!("{}. {}", i + 1, event.trap),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn descriptor(value: &str, flags: &[&str]) -> CliResult<JsValue> {
    let mut entries = vec![("value", parse_value(value))];
    for flag in flags {
        match *flag {
            "writable" | "enumerable" | "configurable" => {
                entries.push((*flag, JsValue::boolean(true)))
            }
            other => return Err(CliError::Shell(format!("Unknown flag: {}", other))),
        }
    }
    Ok(object_with(&entries))
}

/// Literal from shell input: `undefined`, `null`, booleans, numbers,
/// quoted strings; anything else is a bare string
pub fn parse_value(text: &str) -> JsValue {
    let text = text.trim();
    match text {
        "undefined" => return JsValue::Undefined,
        "null" => return JsValue::Null,
        "true" => return JsValue::boolean(true),
        "false" => return JsValue::boolean(false),
        _ => {}
    }
    if let Ok(n) = text.parse::<f64>() {
        return JsValue::number(n);
    }
    let quoted = text.len() >= 2
        && ((text.starts_with('"') && text.ends_with('"'))
            || (text.starts_with('\'') && text.ends_with('\'')));
    if quoted {
        return JsValue::string(&text[1..text.len() - 1]);
    }
    JsValue::string(text)
}

fn format_value(value: &JsValue) -> String {
    match value {
        JsValue::String(s) => format!("{:?}", s),
        other => other.to_string(),
    }
}

fn format_names(names: &[String]) -> String {
    format!("[{}]", names.join(", "))
}

/// Run the interactive shell until `exit` or EOF
pub fn run_shell() -> CliResult<()> {
    let mut editor = DefaultEditor::new()
        .map_err(|e| CliError::Shell(format!("Failed to initialize editor: {}", e)))?;
    let mut shell = Shell::new()?;

    println!("proxy-cli shell v{}", env!("CARGO_PKG_VERSION"));
    println!("Type help for commands or exit to quit.");
    println!();

    loop {
        match editor.readline("proxy> ") {
            Ok(line) => {
                if !line.trim().is_empty() {
                    let _ = editor.add_history_entry(line.as_str());
                }
                match shell.execute(&line) {
                    Ok(ShellOutcome::Exit) => {
                        println!("Goodbye!");
                        break;
                    }
                    Ok(ShellOutcome::Output(text)) if text.is_empty() => {}
                    Ok(ShellOutcome::Output(text)) => println!("{}", text),
                    Err(e) => eprintln!("Error: {}", e),
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("Press Ctrl-D or type 'exit' to quit");
            }
            Err(ReadlineError::Eof) => {
                println!("\nGoodbye!");
                break;
            }
            Err(err) => {
                return Err(CliError::Shell(format!("Readline error: {}", err)));
            }
        }
    }

    Ok(())
}
