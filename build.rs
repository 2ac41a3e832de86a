fn main() {
    // ESP-IDF link/env metadata is only meaningful when the espidf feature
    // is enabled (i.e. building for the chip). Host builds skip it.
    if std::env::var_os("CARGO_FEATURE_ESPIDF").is_some() {
        embuild::espidf::sysenv::output();
    }
}
