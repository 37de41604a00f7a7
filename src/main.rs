fn main() -> anyhow::Result<()> {
    mission_compiler::run()
}
