//! Host globals and native functions.

use tracing::debug;

use crate::binding::BindingKind;
use crate::environment::Env;
use crate::error::{ErrorFamily, RuntimeError};
use crate::value::{NativeFunction, Value};

use super::state::Interpreter;

/// Populate the global record. Script declarations live one record further
/// in, so they shadow these names instead of colliding with them.
pub(crate) fn install_globals(global: &Env) {
    for native in [
        NativeFunction::Print,
        NativeFunction::QueueMicrotask,
        NativeFunction::Error,
    ] {
        global.define(native.name(), BindingKind::Mutable, Value::Native(native));
    }
    global.define("undefined", BindingKind::Immutable, Value::Undefined);
    global.define("NaN", BindingKind::Immutable, Value::Number(f64::NAN));
    global.define("Infinity", BindingKind::Immutable, Value::Number(f64::INFINITY));
}

impl Interpreter<'_> {
    pub(crate) fn call_native(
        &mut self,
        native: NativeFunction,
        arguments: &[Value],
    ) -> Result<Value, RuntimeError> {
        match native {
            NativeFunction::Print => {
                let line = arguments
                    .iter()
                    .map(Value::to_display_string)
                    .collect::<Vec<_>>()
                    .join(" ");
                if self.options.echo_output {
                    println!("{line}");
                }
                self.output.push(line);
                Ok(Value::Undefined)
            }
            NativeFunction::QueueMicrotask => {
                let Some(callback) = arguments.first().filter(|v| v.is_callable()) else {
                    return Err(RuntimeError::type_error(
                        "queueMicrotask: argument is not a function",
                    ));
                };
                self.jobs.push_back(callback.clone());
                debug!(pending = self.jobs.len(), "job enqueued");
                Ok(Value::Undefined)
            }
            NativeFunction::Error => {
                let message = arguments
                    .first()
                    .filter(|v| !v.is_undefined())
                    .map(Value::to_display_string)
                    .unwrap_or_default();
                Ok(Value::error(ErrorFamily::Error, message))
            }
        }
    }
}
