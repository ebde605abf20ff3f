use std::io::Write;

use env_logger::Env;

pub fn init_logger(level: log::Level) {
    env_logger::Builder::from_env(
        Env::default().filter_or("RUST_LOG", format!("{level},egg=off")),
    )
    .format(|buf, record| {
        let style = buf.default_level_style(record.level());
        let module_style = anstyle::Style::new().dimmed().italic();
        let module = record.module_path().unwrap_or("?");
        writeln!(
            buf,
            "[{style}{}{style:#} {module_style}{module}{module_style:#}] {}",
            record.level(),
            record.args()
        )
    })
    .init();
}
