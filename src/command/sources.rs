use crate::conf::Conf;
use crate::wfs::Source;
use crate::Result;

pub fn run(conf: &Conf) -> Result<()> {
    for (i, source) in conf.sources.iter().enumerate() {
        println!("{}", describe(i + 1, source));
    }
    Ok(())
}

fn describe(priority: usize, source: &Source) -> String {
    let type_names = if source.type_names.is_empty() {
        "discovered".to_string()
    } else {
        source.type_names.join(",")
    };
    format!(
        "{priority}. {} ({}) {} {} format={} types={type_names}",
        source.id, source.name, source.url, source.crs, source.format,
    )
}
