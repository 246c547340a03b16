fn main() {
    stitchpad_lib::run()
}
