use crate::cli::RouteFormat;
use crate::routes;

pub fn handle(format: RouteFormat) -> anyhow::Result<()> {
    let listing = routes::build()?.routes();
    let output = match format {
        RouteFormat::Json => serde_json::to_string_pretty(&listing)?,
        RouteFormat::Yaml => serde_yaml::to_string(&listing)?,
    };
    println!("{}", output);
    Ok(())
}
