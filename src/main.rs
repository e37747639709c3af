fn main() -> anyhow::Result<()> {
    brick_placer::run()
}
