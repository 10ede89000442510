//! `edgeport init`: generate a starter configuration file.
//!
//! Writes a commented `key = value` file listing every recognized key
//! with its default value.

use crate::cli::InitArgs;
use crate::error::EdgeError;

pub fn execute(args: &InitArgs) -> Result<(), EdgeError> {
    let output = &args.output;

    if output.exists() && !args.force {
        return Err(EdgeError::FileExists {
            path: output.clone(),
        });
    }

    if let Some(dir) = output.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)?;
    }
    std::fs::write(output, STARTER_CONFIG)?;
    println!("Created {}", output.display());
    Ok(())
}

pub const STARTER_CONFIG: &str = r"# edgeport config
#
# Format: one `key = value` per line, `#` starts a comment line.
# Every value below is the built-in default. Environment variables
# (STATIC_*, API_PROXY_*) override this file.

server.host = 0.0.0.0
server.port = 80

static.frontend_root = /app/frontend

log.dir = /app/logs
log.file = static-server.log

auth.enabled = true
auth.prefix = /api/auth

proxy.enabled = true

# One route per line: prefix,host,port[,mode]   (mode: http | raw)
proxy.route = /api,127.0.0.1,8080,http
# proxy.route = /api/mcp,127.0.0.1,9000,raw

# Or the indexed form, applied in id order. When any indexed key is
# present it replaces every `proxy.route` line above.
# proxy.route.a.prefix = /api
# proxy.route.a.upstream_host = 127.0.0.1
# proxy.route.a.upstream_port = 8080
# proxy.route.a.mode = http
";
