fn main() {
    println!("cargo:rerun-if-changed=gdc.toml");

    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
