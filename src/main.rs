fn main() -> anyhow::Result<()> {
    liftscript::run()
}
