fn main() -> Result<(), Box<dyn std::error::Error>> {
    smartlists::runtime::run()
}
