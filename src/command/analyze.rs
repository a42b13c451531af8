use crate::conf::Conf;
use crate::parcel::analysis::{self, Analysis};
use crate::parcel::area::AreaResult;
use crate::wfs::{Resolution, Resolver, WfsClient};
use crate::{Error, Result};
use std::{fs, io};

struct Args {
    swap: bool,
    json: bool,
    path: Option<String>,
}

fn parse_args(args: &[String]) -> Result<Args> {
    let mut res = Args {
        swap: false,
        json: false,
        path: None,
    };
    for arg in args {
        match arg.as_str() {
            "--swap" => res.swap = true,
            "--json" => res.json = true,
            flag if flag.starts_with("--") => {
                return Err(Error::Cli(format!("Unknown flag: {flag}")))
            }
            path => {
                if res.path.is_some() {
                    return Err(Error::Cli("Only one input file is supported".into()));
                }
                res.path = Some(path.into());
            }
        }
    }
    Ok(res)
}

/// Reads coordinates from a file, or stdin when no file is given, and prints the report.
pub async fn run(conf: Conf, args: &[String]) -> Result<()> {
    let args = parse_args(args)?;
    let text = match &args.path {
        Some(path) => fs::read_to_string(path)?,
        None => io::read_to_string(io::stdin())?,
    };
    let resolver = Resolver::new(WfsClient::new()?, conf.sources);
    let analysis = analysis::analyze(&text, args.swap, &resolver).await?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&analysis)?);
    } else {
        println!("{}", report(&analysis));
    }
    Ok(())
}

pub fn format_area(area: &AreaResult) -> String {
    format!("{:.0} m2 / {:.2} ar / {:.4} ha", area.m2, area.ar, area.ha)
}

fn report(analysis: &Analysis) -> String {
    let mut lines = vec![
        format!("Points: {}", analysis.points.len()),
        format!("Area: {}", format_area(&analysis.area)),
    ];
    match &analysis.mpzp {
        Resolution::Found {
            source_name,
            attributes,
            plan_status,
            ..
        } => {
            lines.push(format!("MPZP ({source_name}), {plan_status}:"));
            for (key, value) in attributes.iter() {
                lines.push(format!("  {key}: {value}"));
            }
        }
        Resolution::Unavailable { message, .. } => lines.push(message.clone()),
    }
    lines.join("\n")
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::test::ScriptedLookup;

    fn strings(args: &[&str]) -> Vec<String> {
        args.iter().map(|it| it.to_string()).collect()
    }

    #[test]
    fn parse_flags_and_path() -> Result<()> {
        let args = parse_args(&strings(&["--swap", "parcel.txt", "--json"]))?;
        assert!(args.swap);
        assert!(args.json);
        assert_eq!(Some("parcel.txt".to_string()), args.path);
        let args = parse_args(&[])?;
        assert!(!args.swap && !args.json && args.path.is_none());
        Ok(())
    }

    #[test]
    fn parse_rejects_junk() {
        assert!(matches!(parse_args(&strings(&["--nope"])), Err(Error::Cli(_))));
        assert!(matches!(parse_args(&strings(&["a", "b"])), Err(Error::Cli(_))));
    }

    #[test]
    fn format_area_precision() {
        assert_eq!(
            "15904 m2 / 159.04 ar / 1.5904 ha",
            format_area(&AreaResult::from_m2(15_904.02))
        );
    }

    #[actix_web::test]
    async fn report_without_plan() -> Result<()> {
        let resolver = Resolver::new(ScriptedLookup::new(vec![]), vec![]);
        let analysis = analysis::analyze("0 0 0 0.001 0.001 0.001", false, &resolver).await?;
        let report = report(&analysis);
        assert!(report.starts_with("Points: 3\nArea: "));
        assert!(report.ends_with("No plan services are configured."));
        Ok(())
    }
}
